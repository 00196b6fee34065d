// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Theory matrix row generation.

For every usable sample of a lagged product stream one sparse complex row
of the theory matrix is produced, mapping range-gated unknown ACF values
to the expected lagged product. The row at sample `k+1` differs from the
row at sample `k` only by one ambiguity sample entering and one leaving
each gate, so rows are maintained with a sliding update that costs
O(n_ranges) per sample instead of a full re-integration.

Each row carries a per-column occupancy count: the number of marked
ambiguity samples integrated into that column. A zero count marks a
blind range and the column value is forced to exactly zero so that
consumers can detect blind ranges from the counts alone.
*/
use log::trace;
use num_complex::Complex;

use crate::lag_profile::LagProfile;

pub mod error;
use error::TheoryMatrixError;

#[cfg(test)]
mod test;

/// Range gating and reception parameters of a theory row scan.
///
#[derive(Debug, Clone)]
pub struct TheoryRowScan {
    /// Range gate limits: `n_ranges` gates need `n_ranges + 1` strictly
    /// increasing sample delays, the lowest at least one
    pub r_lims: Vec<i32>,
    /// Add a constant background column to every row
    pub background: bool,
    /// Remote reception: samples during transmitter pulses stay usable
    pub remote_rx: bool,
}

impl TheoryRowScan {
    /// Number of range gates.
    pub fn n_ranges(&self) -> usize {
        self.r_lims.len().saturating_sub(1)
    }

    /// Number of unknowns per row (gates plus the background column).
    pub fn n_unknowns(&self) -> usize {
        self.n_ranges() + 1
    }

    fn validate(&self) -> Result<(), TheoryMatrixError> {
        if self.r_lims.len() < 2
            || self.r_lims[0] < 1
            || self.r_lims.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(TheoryMatrixError::InvalidRangeLimits);
        }
        Ok(())
    }
}

/// A batch of theory matrix rows with their measurements and variances.
///
/// Rows are stored concatenated in row-major order, `n_unknowns` values
/// per row; only the first `n_rows` rows are valid. The vectors are
/// grown as needed and reused across calls.
///
#[derive(Debug, Clone, Default)]
pub struct TheoryRowBatch {
    /// Number of columns in each row
    pub n_unknowns: usize,
    /// Concatenated complex rows
    pub a_rows: Vec<Complex<f64>>,
    /// Occupancy counts matching `a_rows`; zero marks a blind column
    pub i_rows: Vec<i32>,
    /// One complex measurement per stored row
    pub meas: Vec<Complex<f64>>,
    /// One measurement variance per stored row
    pub var: Vec<f64>,
    /// Number of valid rows
    pub n_rows: usize,
}

impl TheoryRowBatch {
    /// An empty batch; [`theory_rows`] sizes it on first use.
    pub fn new() -> Self {
        TheoryRowBatch::default()
    }

    /// One stored row as (values, occupancy) slices.
    ///
    /// # Arguments
    ///
    /// * `row` - row index, `row < n_rows`.
    ///
    pub fn row(&self, row: usize) -> (&[Complex<f64>], &[i32]) {
        assert!(row < self.n_rows);
        let start = row * self.n_unknowns;
        let end = start + self.n_unknowns;
        (&self.a_rows[start..end], &self.i_rows[start..end])
    }

    /// Make room for `capacity` rows of `n_unknowns` columns, plus the
    /// scratch row the sliding update maintains past the last stored one.
    fn reset(&mut self, n_unknowns: usize, capacity: usize) {
        self.n_unknowns = n_unknowns;
        self.n_rows = 0;
        let len = capacity * n_unknowns;
        if self.a_rows.len() < len {
            self.a_rows.resize(len, Complex::new(0.0, 0.0));
            self.i_rows.resize(len, 0);
        }
        if self.meas.len() < capacity {
            self.meas.resize(capacity, Complex::new(0.0, 0.0));
            self.var.resize(capacity, 0.0);
        }
    }
}

/// Make theory matrix rows and measurement vectors for the sample window
/// `[n_cur, n_end)`.
///
/// The first usable sample is `n_start = max(n_cur, r_lims[n_ranges])`;
/// everything closer to the start of data than the highest gate has an
/// incompletely known ambiguity and is skipped. A row is stored at each
/// sample whose lagged product marker is set and whose distance from the
/// last transmitter pulse lies strictly between `r_lims[0] - 2` (or `-1`
/// for remote reception) and `r_lims[n_ranges] + 1`.
///
/// The caller re-invokes with `n_cur = n_end` until the end of data is
/// reached.
///
/// # Arguments
///
/// * `amb` - range ambiguity stream for this lag.
///
/// * `prod` - lagged product stream for this lag.
///
/// * `var` - measurement variance per sample.
///
/// * `n_cur` - first sample of the window.
///
/// * `n_end` - one past the last sample of the window.
///
/// * `scan` - range gating and reception parameters.
///
/// * `batch` - output rows, overwritten.
///
///
/// # Returns
///
/// * A Result containing the number of rows stored, or
///   `TheoryMatrixError::EmptyBatch` when the window holds no usable
///   start sample (the driver then advances to the next window).
///
pub fn theory_rows(
    amb: &LagProfile,
    prod: &LagProfile,
    var: &[f64],
    n_cur: usize,
    n_end: usize,
    scan: &TheoryRowScan,
    batch: &mut TheoryRowBatch,
) -> Result<usize, TheoryMatrixError> {
    scan.validate()?;

    let n_ranges = scan.n_ranges();
    let n = scan.n_unknowns();
    let r_lims = &scan.r_lims;

    let n_data = amb
        .len()
        .min(prod.len())
        .min(var.len());
    let n_end = n_end.min(n_data);
    let n_cur = n_cur.min(n_data);

    // Samples whose ambiguity reaches below this range are discarded for
    // monostatic reception; remote reception accepts everything
    let r_min = i64::from(r_lims[0]) - 2;
    let r_lim = if scan.remote_rx { -1 } else { r_min };
    // The highest range gate limit
    let r_max = i64::from(r_lims[n_ranges]) + 1;

    // The first row needs r_lims[n_ranges] samples of ambiguity history
    let n_start = n_cur.max(r_lims[n_ranges] as usize);
    debug_assert!(n_start >= r_lims[n_ranges] as usize);

    batch.reset(n, n_end.saturating_sub(n_cur) + 1);

    if n_start >= n_end {
        return Err(TheoryMatrixError::EmptyBatch { n_cur, n_end });
    }

    // Integrate the first row gate by gate
    for i in 0..n_ranges {
        let mut value = Complex::new(0.0, 0.0);
        let mut count = 0_i32;
        for j in r_lims[i]..r_lims[i + 1] {
            let idx = n_start - j as usize;
            // Unmarked points may hold stale values from an earlier lag,
            // the marker must be checked before every addition
            if amb.markers[idx] != 0 {
                value += amb.values[idx];
                count += amb.markers[idx];
            }
        }
        batch.a_rows[i] = value;
        batch.i_rows[i] = count;
    }
    // The last column models a constant background, when enabled
    batch.a_rows[n_ranges] = if scan.background {
        Complex::new(1.0, 0.0)
    } else {
        Complex::new(0.0, 0.0)
    };
    batch.i_rows[n_ranges] = i32::from(scan.background);

    // From here on every possible row is formed, but only those passing
    // the gate below are kept; the rest are overwritten in place.
    let mut n_rows = 0_usize;

    // Distance from the latest transmitter pulse, warmed up over the
    // samples just before the window
    let mut r_cur = r_max;
    let mut k = n_start as i64 - r_min;
    while k < n_start as i64 {
        if k >= 0 {
            if amb.markers[k as usize] != 0 {
                r_cur = 0;
            } else {
                r_cur += 1;
            }
        }
        k += 1;
    }

    for k in n_start..n_end {
        if prod.markers[k] != 0 && r_cur > r_lim && r_cur < r_max {
            batch.meas[n_rows] = prod.values[k];
            batch.var[n_rows] = var[k];

            // Keep this row: copy it to the next slot and continue
            // sliding there. Columns with zero occupancy are forced to
            // exactly zero in both copies, which makes identification
            // of blind ranges much easier.
            let (cur, next) = (n_rows * n, (n_rows + 1) * n);
            for i in 0..n {
                batch.i_rows[next + i] = batch.i_rows[cur + i];
                if batch.i_rows[cur + i] == 0 {
                    batch.a_rows[cur + i] = Complex::new(0.0, 0.0);
                    batch.a_rows[next + i] = Complex::new(0.0, 0.0);
                } else {
                    batch.a_rows[next + i] = batch.a_rows[cur + i];
                }
            }
            n_rows += 1;
        }

        // Slide the live row one sample forward: one ambiguity sample
        // enters and one leaves each gate
        for i in 0..n_ranges {
            let gati = n_rows * n + i;
            let addi = k + 1 - r_lims[i] as usize;
            let subi = k + 1 - r_lims[i + 1] as usize;

            if amb.markers[addi] != 0 {
                batch.a_rows[gati] += amb.values[addi];
                batch.i_rows[gati] += amb.markers[addi];
            }
            if amb.markers[subi] != 0 {
                batch.a_rows[gati] -= amb.values[subi];
                batch.i_rows[gati] -= amb.markers[subi];
            }
        }

        // Track the distance from the last transmitter pulse, which
        // gates out echoes from below the first range gate
        if amb.markers[k] != 0 {
            r_cur = 0;
        } else {
            r_cur += 1;
        }
    }

    batch.n_rows = n_rows;
    trace!(
        "theory_rows: {} rows from samples {}..{}",
        n_rows,
        n_start,
        n_end
    );

    Ok(n_rows)
}
