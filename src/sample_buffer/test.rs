// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Unit tests for the sample buffer
*/
#[cfg(test)]
use super::*;

#[test]
fn test_from_gdf_marks_all_rx_usable() {
    let data = GdfData {
        samples: vec![Complex::new(1.0, 2.0), Complex::new(3.0, 4.0)],
        pps: vec![1, 0],
        tx: vec![0, 1],
    };
    let buffer = SampleBuffer::from_gdf(data);
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.tx, vec![0, 1]);
    assert_eq!(buffer.rx, vec![1, 1]);
}

#[test]
fn test_truncate_shrinks_all_streams() {
    let mut buffer = SampleBuffer::new(
        vec![Complex::new(0.0, 0.0); 5],
        vec![1; 5],
        vec![1; 5],
    );
    buffer.truncate(3);
    assert_eq!(buffer.samples.len(), 3);
    assert_eq!(buffer.tx.len(), 3);
    assert_eq!(buffer.rx.len(), 3);

    // Truncating past the end is a no-op
    buffer.truncate(10);
    assert_eq!(buffer.len(), 3);
}

#[test]
#[should_panic]
fn test_new_rejects_mismatched_lengths() {
    let _ = SampleBuffer::new(vec![Complex::new(0.0, 0.0); 4], vec![1; 3], vec![1; 4]);
}

#[test]
fn test_read_gdf_propagates_loader_errors() {
    let result = SampleBuffer::read_gdf(
        &[GdfFileSlice::new("/nonexistent/nowhere.gdf", 0, 7)],
        Endianness::Little,
    );
    assert!(matches!(result.unwrap_err(), LpiError::GdfFile(_)));
}
