// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Ground clutter estimation and subtraction.

Persistent ground echoes within the contiguous ranges `r_min..=r_max`
are modelled as a deterministic complex profile. [`clutter_meas`] adds
one unit-variance measurement row per usable receiver sample to a
Fisher accumulator of `r_max - r_min + 1` unknowns; the outer solver
inverts it into a clutter profile. [`clutter_subtract`] then convolves
the transmitter samples with that profile and removes the predicted
clutter from the receiver samples in place.

In both passes the theory row at a sample is simply the `nx` preceding
transmitter samples; the largest range corresponds to row index 0.
*/
use log::debug;
use num_complex::Complex;

use crate::fisher::FisherAccumulator;


/// Measure the ground clutter signal: accumulate one unit-variance
/// measurement row per usable receiver sample into `fisher`.
///
/// Both sample vectors are first forced to zero wherever their marker is
/// zero; the theory rows are then dense windows of transmitter samples
/// and need no occupancy bookkeeping.
///
/// A sample is usable when its distance `r` from the last transmitter
/// sample satisfies `r_min <= r <= r_max`, at least one transmitter
/// sample lies within the clutter window, and the receiver marker is
/// set.
///
/// # Arguments
///
/// * `tx_samples` - complex transmitter samples; zeroed where unmarked.
///
/// * `tx_markers` - transmitter marker vector.
///
/// * `rx_samples` - complex receiver samples; zeroed where unmarked.
///
/// * `rx_markers` - receiver marker vector.
///
/// * `r_min` - lowest clutter range (inclusive).
///
/// * `r_max` - highest clutter range (inclusive).
///
/// * `fisher` - accumulator of `r_max - r_min + 1` unknowns.
///
///
/// # Returns
///
/// * the number of measurement rows added.
///
pub fn clutter_meas(
    tx_samples: &mut [Complex<f64>],
    tx_markers: &[i32],
    rx_samples: &mut [Complex<f64>],
    rx_markers: &[i32],
    r_min: usize,
    r_max: usize,
    fisher: &mut FisherAccumulator,
) -> usize {
    let nd = tx_samples
        .len()
        .min(tx_markers.len())
        .min(rx_samples.len())
        .min(rx_markers.len());
    let nx = r_max - r_min + 1;
    assert_eq!(fisher.n_unknowns(), nx);

    // Downstream arithmetic assumes zeroes at every unmarked position
    for i in 0..nd {
        if tx_markers[i] == 0 {
            tx_samples[i] = Complex::new(0.0, 0.0);
        }
        if rx_markers[i] == 0 {
            rx_samples[i] = Complex::new(0.0, 0.0);
        }
    }

    if nd <= r_max {
        return 0;
    }

    let mut n_rows = 0;
    let (mut r, mut isum) = warm_up(tx_markers, r_min, r_max);

    for i in r_max..nd {
        if tx_markers[i] != 0 {
            r = 0;
        }
        if r >= r_min as i64
            && r <= r_max as i64
            && isum != 0
            && rx_markers[i] != 0
            && i + 1 < nd
        {
            fisher.add_row_unit_variance(
                &tx_samples[i - r_max..=i - r_min],
                rx_samples[i + 1],
            );
            n_rows += 1;
        }
        isum -= i64::from(tx_markers[i - r_max]);
        if i - r_min + 1 < nd {
            isum += i64::from(tx_markers[i - r_min + 1]);
        }
        r += 1;
    }

    debug!("clutter_meas: {} rows over ranges {}..={}", n_rows, r_min, r_max);
    n_rows
}

/// Subtract the estimated ground clutter signal from the receiver
/// samples in place, using the same gating as [`clutter_meas`].
///
/// # Arguments
///
/// * `tx_samples` - complex transmitter samples.
///
/// * `tx_markers` - transmitter marker vector.
///
/// * `rx_samples` - complex receiver samples, corrected in place.
///
/// * `rx_markers` - receiver marker vector.
///
/// * `r_min` - lowest clutter range (inclusive).
///
/// * `r_max` - highest clutter range (inclusive).
///
/// * `clutter` - estimated clutter profile of `r_max - r_min + 1`
///   values, largest range first.
///
///
/// # Returns
///
/// * the number of corrected receiver samples.
///
pub fn clutter_subtract(
    tx_samples: &[Complex<f64>],
    tx_markers: &[i32],
    rx_samples: &mut [Complex<f64>],
    rx_markers: &[i32],
    r_min: usize,
    r_max: usize,
    clutter: &[Complex<f64>],
) -> usize {
    let nd = tx_samples
        .len()
        .min(tx_markers.len())
        .min(rx_samples.len())
        .min(rx_markers.len());
    let nx = r_max - r_min + 1;
    assert_eq!(clutter.len(), nx);

    if nd <= r_max {
        return 0;
    }

    let mut n_rows = 0;
    let (mut r, mut isum) = warm_up(tx_markers, r_min, r_max);

    for i in r_max..nd.saturating_sub(nx) {
        if tx_markers[i] != 0 {
            r = 0;
        }
        if r >= r_min as i64 && r <= r_max as i64 && isum != 0 && rx_markers[i] != 0 {
            // Predicted clutter: transmitter window convolved with the
            // estimated profile
            let mut clsum = Complex::new(0.0, 0.0);
            for (tx, cl) in tx_samples[i - r_max..=i - r_min].iter().zip(clutter.iter()) {
                clsum += tx * cl;
            }
            rx_samples[i + 1] -= clsum;
            n_rows += 1;
        }
        isum -= i64::from(tx_markers[i - r_max]);
        if i - r_min + 1 < nd {
            isum += i64::from(tx_markers[i - r_min + 1]);
        }
        r += 1;
    }

    debug!(
        "clutter_subtract: {} samples corrected over ranges {}..={}",
        n_rows, r_min, r_max
    );
    n_rows
}

/// Walk the samples up to `r_max` once, counting transmitter-on samples
/// in the leading clutter window and the distance from the last
/// transmitter sample.
fn warm_up(tx_markers: &[i32], r_min: usize, r_max: usize) -> (i64, i64) {
    let nx = r_max - r_min + 1;
    let mut r: i64 = 0;
    let mut isum: i64 = 0;
    for (i, &marker) in tx_markers.iter().enumerate().take(r_max + 1) {
        // The largest range corresponds to index 0; after nx samples the
        // window is below r_min
        if i < nx {
            isum += i64::from(marker);
        }
        r += 1;
        if marker != 0 {
            r = 0;
        }
    }
    (r, isum)
}
