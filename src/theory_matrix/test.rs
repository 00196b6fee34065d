// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Unit tests for theory matrix row generation
*/
#[cfg(test)]
use super::*;

// A lag profile with every sample marked and the sample index as the
// real part, so tests can tell which sample a stored row came from.
#[cfg(test)]
fn indexed_profile(n: usize) -> LagProfile {
    LagProfile {
        values: (0..n).map(|k| Complex::new(k as f64, 0.0)).collect(),
        markers: vec![1; n],
    }
}

#[test]
fn test_theory_rows_delta_ambiguity_warmup() {
    // A single marked ambiguity sample inside the first gate, plus one
    // inside the warm-up region so that rows become storable
    let n = 16;
    let mut amb = LagProfile::zeroed(n);
    amb.values[5] = Complex::new(1.0, 0.0);
    amb.markers[5] = 1;
    amb.values[8] = Complex::new(0.3, 0.0);
    amb.markers[8] = 1;

    let prod = indexed_profile(n);
    let var = vec![2.0; n];

    let scan = TheoryRowScan {
        r_lims: vec![5, 10],
        background: false,
        remote_rx: true,
    };
    let mut batch = TheoryRowBatch::new();

    let n_rows = theory_rows(&amb, &prod, &var, 10, 12, &scan, &mut batch).unwrap();
    assert_eq!(n_rows, 2);

    // The initial row integrates amb[n_start - j] for j in 5..10: only
    // the delta at 5 contributes. The background column is disabled.
    let (values, counts) = batch.row(0);
    assert_eq!(values, &[Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)]);
    assert_eq!(counts, &[1, 0]);

    // Sliding at k = 10 and 11 adds and subtracts only unmarked samples,
    // so the row is unchanged
    let (values, counts) = batch.row(1);
    assert_eq!(values, &[Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)]);
    assert_eq!(counts, &[1, 0]);

    assert_eq!(batch.meas[0], Complex::new(10.0, 0.0));
    assert_eq!(batch.meas[1], Complex::new(11.0, 0.0));
    assert_eq!(batch.var[0], 2.0);
}

#[test]
fn test_theory_rows_sliding_equals_recomputation() {
    // The sliding update must agree with a from-scratch integration of
    // every stored row
    let n = 64;
    let mut amb = LagProfile::zeroed(n);
    for k in 0..n {
        if k % 3 != 1 {
            amb.values[k] = Complex::new((k as f64 * 0.37).sin(), (k as f64 * 0.59).cos());
            amb.markers[k] = 1;
        }
    }
    let prod = indexed_profile(n);
    let var = vec![1.0; n];

    let scan = TheoryRowScan {
        r_lims: vec![3, 7, 12],
        background: true,
        remote_rx: true,
    };
    let mut batch = TheoryRowBatch::new();
    let n_rows = theory_rows(&amb, &prod, &var, 0, n, &scan, &mut batch).unwrap();
    assert!(n_rows > 0);
    assert!(n_rows <= n - 12);

    for row in 0..n_rows {
        let k = batch.meas[row].re as usize;
        let (values, counts) = batch.row(row);
        for gate in 0..2 {
            let mut value = Complex::new(0.0, 0.0);
            let mut count = 0;
            for j in scan.r_lims[gate]..scan.r_lims[gate + 1] {
                let idx = k - j as usize;
                if amb.markers[idx] != 0 {
                    value += amb.values[idx];
                    count += amb.markers[idx];
                }
            }
            assert_eq!(counts[gate], count, "row {} gate {}", row, gate);
            if count == 0 {
                assert_eq!(values[gate], Complex::new(0.0, 0.0));
            } else {
                assert!(
                    (values[gate] - value).norm() < 1e-12,
                    "row {} gate {}: {} != {}",
                    row,
                    gate,
                    values[gate],
                    value
                );
            }
        }
        // Background column
        assert_eq!(values[2], Complex::new(1.0, 0.0));
        assert_eq!(counts[2], 1);
    }
}

#[test]
fn test_theory_rows_monostatic_discards_pulse_ranges() {
    // One transmitter pulse: monostatic reception discards the sample at
    // zero range, remote reception keeps it
    let n = 32;
    let mut amb = LagProfile::zeroed(n);
    amb.values[20] = Complex::new(1.0, 0.0);
    amb.markers[20] = 1;

    let prod = indexed_profile(n);
    let var = vec![1.0; n];

    let mut scan = TheoryRowScan {
        r_lims: vec![2, 5],
        background: false,
        remote_rx: false,
    };

    let mut batch = TheoryRowBatch::new();
    let monostatic = theory_rows(&amb, &prod, &var, 5, 30, &scan, &mut batch).unwrap();
    assert_eq!(monostatic, 5);
    let first_meas = batch.meas[0];

    scan.remote_rx = true;
    let remote = theory_rows(&amb, &prod, &var, 5, 30, &scan, &mut batch).unwrap();
    assert_eq!(remote, 6);
    // Remote reception admits one extra sample, one range gate earlier
    assert_eq!(batch.meas[1], first_meas);
}

#[test]
fn test_theory_rows_blind_columns_are_exact_zero() {
    // A single pulse at sample 8: rows at ranges past the gate window
    // have seen the pulse enter and leave the gate again, so their gate
    // column must come back to exactly zero with zero occupancy
    let n = 24;
    let mut amb = LagProfile::zeroed(n);
    amb.values[8] = Complex::new(0.7, 0.0);
    amb.markers[8] = 1;
    let prod = indexed_profile(n);
    let var = vec![1.0; n];

    let scan = TheoryRowScan {
        r_lims: vec![2, 5],
        background: true,
        remote_rx: false,
    };
    let mut batch = TheoryRowBatch::new();
    let n_rows = theory_rows(&amb, &prod, &var, 5, 20, &scan, &mut batch).unwrap();
    // Ranges 1..=5 after the pulse are stored, at samples 10..=14
    assert_eq!(n_rows, 5);
    for row in 0..n_rows {
        let k = batch.meas[row].re as usize;
        let (values, counts) = batch.row(row);
        if k <= 12 {
            // The pulse sample is inside the gate window [k-4, k-2]
            assert_eq!(counts[0], 1);
            assert_eq!(values[0], Complex::new(0.7, 0.0));
        } else {
            // Pulse added and subtracted again: blind, exactly zero
            assert_eq!(counts[0], 0);
            assert_eq!(values[0], Complex::new(0.0, 0.0));
        }
        // Background stays populated
        assert_eq!(counts[1], 1);
    }
}

#[test]
fn test_theory_rows_empty_batch() {
    let n = 16;
    let amb = indexed_profile(n);
    let prod = indexed_profile(n);
    let var = vec![1.0; n];

    let scan = TheoryRowScan {
        r_lims: vec![5, 10],
        background: false,
        remote_rx: false,
    };
    let mut batch = TheoryRowBatch::new();

    // The window ends before the highest range gate
    let result = theory_rows(&amb, &prod, &var, 0, 8, &scan, &mut batch);
    assert!(matches!(
        result.unwrap_err(),
        TheoryMatrixError::EmptyBatch { .. }
    ));
    assert_eq!(batch.n_rows, 0);
}

#[test]
fn test_theory_rows_rejects_bad_range_limits() {
    let n = 16;
    let amb = indexed_profile(n);
    let prod = indexed_profile(n);
    let var = vec![1.0; n];
    let mut batch = TheoryRowBatch::new();

    for r_lims in [vec![5], vec![5, 5], vec![7, 3], vec![0, 4]] {
        let scan = TheoryRowScan {
            r_lims,
            background: false,
            remote_rx: false,
        };
        let result = theory_rows(&amb, &prod, &var, 0, n, &scan, &mut batch);
        assert!(matches!(
            result.unwrap_err(),
            TheoryMatrixError::InvalidRangeLimits
        ));
    }
}
