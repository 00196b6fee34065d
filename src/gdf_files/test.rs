// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Unit tests for gdf file reading
*/
#[cfg(test)]
use super::*;
use std::fs::File;
use std::io::Write;

// Helper function to generate a (small) test gdf file from (I, Q, pps, tx)
// records. The marker bits are OR'd into the lowest bits of I and Q.
#[cfg(test)]
fn generate_test_gdf_file(
    temp_dir: &tempdir::TempDir,
    filename: &str,
    records: &[(i16, i16, bool, bool)],
    endianness: Endianness,
) -> String {
    let full_filename = temp_dir.path().join(filename);
    let mut output_file = File::create(&full_filename).expect("cannot create test gdf file");

    let mut buffer: Vec<u8> = Vec::with_capacity(records.len() * 4);
    for &(i_val, q_val, pps, tx) in records {
        let i_enc = (i_val & !1) | i16::from(pps);
        let q_enc = (q_val & !1) | i16::from(tx);
        match endianness {
            Endianness::Little => {
                buffer.extend_from_slice(&i_enc.to_le_bytes());
                buffer.extend_from_slice(&q_enc.to_le_bytes());
            }
            Endianness::Big => {
                buffer.extend_from_slice(&i_enc.to_be_bytes());
                buffer.extend_from_slice(&q_enc.to_be_bytes());
            }
        }
    }
    output_file.write_all(&buffer).expect("write failed");
    output_file.flush().expect("flush failed");

    String::from(full_filename.to_str().unwrap())
}

#[test]
fn test_read_gdf_data_no_files() {
    let result = read_gdf_data(&[], Endianness::Little);
    assert!(matches!(result.unwrap_err(), GdfFileError::NoGdfFiles));
}

#[test]
fn test_read_gdf_data_little_endian() {
    let temp_dir = tempdir::TempDir::new("lpilib-gdf").unwrap();
    let records = [
        (100_i16, 200_i16, false, false),
        (-4, 6, true, true),
        (32766, -32768, false, true),
        (0, 0, true, false),
    ];
    let filename = generate_test_gdf_file(&temp_dir, "le.gdf", &records, Endianness::Little);

    let data = read_gdf_data(
        &[GdfFileSlice::new(&filename, 0, 3)],
        Endianness::Little,
    )
    .expect("read failed");

    assert_eq!(data.len(), 4);
    assert_eq!(data.pps, vec![0, 1, 0, 1]);
    assert_eq!(data.tx, vec![0, 1, 1, 0]);
    // Marker bits masked out of the numeric samples
    assert_eq!(data.samples[0], Complex::new(100.0, 200.0));
    assert_eq!(data.samples[1], Complex::new(-4.0, 6.0));
    assert_eq!(data.samples[2], Complex::new(32766.0, -32768.0));
    assert_eq!(data.samples[3], Complex::new(0.0, 0.0));
}

#[test]
fn test_read_gdf_data_big_endian() {
    let temp_dir = tempdir::TempDir::new("lpilib-gdf").unwrap();
    let records = [(258_i16, -514_i16, true, false), (2, 4, false, true)];
    let filename = generate_test_gdf_file(&temp_dir, "be.gdf", &records, Endianness::Big);

    let data = read_gdf_data(&[GdfFileSlice::new(&filename, 0, 1)], Endianness::Big)
        .expect("read failed");

    assert_eq!(data.len(), 2);
    assert_eq!(data.pps, vec![1, 0]);
    assert_eq!(data.tx, vec![0, 1]);
    assert_eq!(data.samples[0], Complex::new(258.0, -514.0));
    assert_eq!(data.samples[1], Complex::new(2.0, 4.0));
}

#[test]
fn test_read_gdf_data_subrange_and_concatenation() {
    let temp_dir = tempdir::TempDir::new("lpilib-gdf").unwrap();
    let records: Vec<(i16, i16, bool, bool)> = (0..8)
        .map(|k| (2 * k as i16, -2 * k as i16, false, false))
        .collect();
    let filename = generate_test_gdf_file(&temp_dir, "sub.gdf", &records, Endianness::Little);

    // Read samples 2..=4 and 6..=7 of the same file as two slices
    let data = read_gdf_data(
        &[
            GdfFileSlice::new(&filename, 2, 4),
            GdfFileSlice::new(&filename, 6, 7),
        ],
        Endianness::Little,
    )
    .expect("read failed");

    assert_eq!(data.len(), 5);
    let expected_re = [4.0, 6.0, 8.0, 12.0, 14.0];
    for (sample, re) in data.samples.iter().zip(expected_re) {
        assert_eq!(sample.re, re);
        assert_eq!(sample.im, -re);
    }
}

#[test]
fn test_read_gdf_data_short_read() {
    let temp_dir = tempdir::TempDir::new("lpilib-gdf").unwrap();
    let records = [(2_i16, 2_i16, false, false), (4, 4, false, false)];
    let filename = generate_test_gdf_file(&temp_dir, "short.gdf", &records, Endianness::Little);

    // Ask for 4 samples from a 2-sample file
    let result = read_gdf_data(&[GdfFileSlice::new(&filename, 0, 3)], Endianness::Little);

    match result.unwrap_err() {
        GdfFileError::ShortRead { expected, got, .. } => {
            assert_eq!(expected, 16);
            assert_eq!(got, 8);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_read_gdf_data_open_failure() {
    let result = read_gdf_data(
        &[GdfFileSlice::new("/nonexistent/nowhere.gdf", 0, 1)],
        Endianness::Little,
    );
    assert!(matches!(result.unwrap_err(), GdfFileError::OpenFailed { .. }));
}

#[test]
fn test_read_gdf_data_invalid_range() {
    let result = read_gdf_data(
        &[GdfFileSlice::new("whatever.gdf", 5, 2)],
        Endianness::Little,
    );
    assert!(matches!(
        result.unwrap_err(),
        GdfFileError::InvalidSampleRange { .. }
    ));
}
