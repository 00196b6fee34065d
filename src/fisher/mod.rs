// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Normal equation accumulators.

Theory rows are folded into the upper triangular part of the Fisher
information matrix `Q = A^H S^-1 A` and the modified measurement vector
`y = A^H S^-1 m` without ever materialising the full theory matrix. The
accumulators are commutative across rows up to floating point
associativity; within a row the column order is fixed ascending so that
repeated runs reproduce bit-identical sums.

The occupancy counts of the rows drive a sparsity skip: a column with
zero count contributes nothing and whole strips of the triangle are
jumped over.
*/
use num_complex::Complex;

use crate::lag_profile::LagProfile;
use crate::misc::{upper_triangle_index, upper_triangle_len};
use crate::theory_matrix::TheoryRowBatch;


/// Upper triangular Fisher information matrix and modified measurement
/// vector, accumulated over theory row batches.
///
/// The matrix is Hermitian positive semidefinite; only the upper
/// triangle is stored, packed row-major (see
/// [`crate::misc::upper_triangle_index`]), and the stored diagonal has
/// exactly zero imaginary part. The accumulator persists across many row
/// batches within one inversion and is emptied only by the outer solver.
///
#[derive(Debug, Clone)]
pub struct FisherAccumulator {
    /// Number of unknowns
    n: usize,
    /// Packed upper triangle of the Fisher information matrix
    pub q: Vec<Complex<f64>>,
    /// Modified measurement vector
    pub y: Vec<Complex<f64>>,
}

impl FisherAccumulator {
    /// A zeroed accumulator for `n` unknowns.
    ///
    /// # Arguments
    ///
    /// * `n` - number of unknowns (range gates plus optional background).
    ///
    pub fn new(n: usize) -> Self {
        FisherAccumulator {
            n,
            q: vec![Complex::new(0.0, 0.0); upper_triangle_len(n)],
            y: vec![Complex::new(0.0, 0.0); n],
        }
    }

    /// Number of unknowns.
    pub fn n_unknowns(&self) -> usize {
        self.n
    }

    /// Reset the accumulator to zero without reallocating.
    pub fn clear(&mut self) {
        self.q.fill(Complex::new(0.0, 0.0));
        self.y.fill(Complex::new(0.0, 0.0));
    }

    /// Fold a batch of theory rows into the accumulator: for each row
    /// `a` with measurement `m` and variance `s`, add `conj(a_i) a_j / s`
    /// to `Q[i][j]` over the upper triangle and `conj(a_i) m / s` to
    /// `y[i]`.
    ///
    /// Columns with zero occupancy are skipped; with sparse transmitter
    /// masks this saves most of the work.
    ///
    /// # Arguments
    ///
    /// * `batch` - theory rows to accumulate; its width must match the
    ///   number of unknowns.
    ///
    pub fn add_rows(&mut self, batch: &TheoryRowBatch) {
        let n = self.n;
        assert_eq!(batch.n_unknowns, n);

        for r in 0..batch.n_rows {
            let row = &batch.a_rows[r * n..(r + 1) * n];
            let occ = &batch.i_rows[r * n..(r + 1) * n];
            let m = batch.meas[r];
            let inv_var = 1.0 / batch.var[r];

            for i in 0..n {
                if occ[i] == 0 {
                    continue;
                }
                // The conjugate product comes first: on the diagonal its
                // imaginary part cancels exactly, keeping the stored
                // diagonal real to the last bit
                let ai_conj = row[i].conj();
                let base = upper_triangle_index(i, i, n);
                for j in i..n {
                    if occ[j] != 0 {
                        self.q[base + (j - i)] += ai_conj * row[j] * inv_var;
                    }
                }
                self.y[i] += ai_conj * m * inv_var;
            }
        }
    }

    /// Matched filter decoding: fold only the diagonal of each row's
    /// outer product, plus the measurement vector. The diagonal entries
    /// stay real. No sparsity skip is needed; unoccupied columns hold
    /// exact zeros and contribute nothing.
    ///
    /// # Arguments
    ///
    /// * `batch` - theory rows to accumulate; its width must match the
    ///   number of unknowns.
    ///
    pub fn add_rows_diagonal(&mut self, batch: &TheoryRowBatch) {
        let n = self.n;
        assert_eq!(batch.n_unknowns, n);

        for r in 0..batch.n_rows {
            let row = &batch.a_rows[r * n..(r + 1) * n];
            let m = batch.meas[r];
            let inv_var = 1.0 / batch.var[r];

            for i in 0..n {
                let ai_conj = row[i].conj();
                self.q[upper_triangle_index(i, i, n)] += ai_conj * row[i] * inv_var;
                self.y[i] += ai_conj * m * inv_var;
            }
        }
    }

    /// Fold one dense row with unit variance. Used by the ground clutter
    /// estimation, which adds rows one receiver sample at a time.
    ///
    /// # Arguments
    ///
    /// * `row` - one dense theory row of `n` values.
    ///
    /// * `meas` - the measurement belonging to the row.
    ///
    pub fn add_row_unit_variance(&mut self, row: &[Complex<f64>], meas: Complex<f64>) {
        let n = self.n;
        assert_eq!(row.len(), n);

        let mut qi = 0;
        for i in 0..n {
            let ai_conj = row[i].conj();
            for j in i..n {
                self.q[qi] += ai_conj * row[j];
                qi += 1;
            }
            self.y[i] += ai_conj * meas;
        }
    }

    /// Materialise the full Hermitian matrix in row-major order, the
    /// lower triangle filled by conjugation.
    ///
    /// # Returns
    ///
    /// * the n x n matrix as a flat row-major vector.
    ///
    pub fn dense(&self) -> Vec<Complex<f64>> {
        let n = self.n;
        let mut full = vec![Complex::new(0.0, 0.0); n * n];
        for i in 0..n {
            for j in i..n {
                let value = self.q[upper_triangle_index(i, j, n)];
                full[i * n + j] = value;
                full[j * n + i] = value.conj();
            }
        }
        full
    }
}

/// Variance- and transmitter-power-weighted average lag profile over a
/// contiguous range window below one inter-pulse period.
///
/// Each usable lagged product is divided by its variance, weighted with
/// the zero-lag ambiguity of the most recent pulse and summed into the
/// slot of its range; the inverse variances are summed with the squared
/// weight. The outer solver divides the two sums to obtain the profile.
///
#[derive(Debug, Clone)]
pub struct WeightedProfileSum {
    /// Lowest range of the window (inclusive)
    pub r_min: usize,
    /// Highest range of the window (exclusive)
    pub r_max: usize,
    /// Weighted measurement sums per range
    pub m: Vec<Complex<f64>>,
    /// Weighted inverse variance sums per range
    pub v: Vec<f64>,
}

impl WeightedProfileSum {
    /// A zeroed profile accumulator for ranges `r_min..r_max`.
    ///
    /// # Arguments
    ///
    /// * `r_min` - lowest range of the window (inclusive).
    ///
    /// * `r_max` - highest range of the window (exclusive).
    ///
    pub fn new(r_min: usize, r_max: usize) -> Self {
        assert!(r_max >= r_min);
        WeightedProfileSum {
            r_min,
            r_max,
            m: vec![Complex::new(0.0, 0.0); r_max - r_min],
            v: vec![0.0; r_max - r_min],
        }
    }

    /// Accumulate one lag of data into the profile.
    ///
    /// The range counter follows the ambiguity markers: it resets to
    /// zero on every marked sample and the ambiguity value at the most
    /// recent marked sample provides the weight. The first ranges after
    /// the start of data are skipped because their ambiguity is unknown.
    ///
    /// # Arguments
    ///
    /// * `prod` - lagged product stream.
    ///
    /// * `amb` - range ambiguity stream for the same lag.
    ///
    /// * `var` - measurement variance per sample.
    ///
    pub fn accumulate(&mut self, prod: &LagProfile, amb: &LagProfile, var: &[f64]) {
        let nd = prod.len().min(amb.len()).min(var.len());

        // Skip the first r_max points, their range ambiguity is unknown
        let mut r = self.r_max as i64 + 1;
        let mut r0 = 0_usize;

        for i in 0..nd {
            if r >= self.r_min as i64 && r < self.r_max as i64 && prod.markers[i] != 0 {
                let slot = (r as usize) - self.r_min;
                // At zero lag the ambiguity is a real power, use its
                // real part as the weight
                let weight = amb.values[r0].re;
                self.m[slot] += prod.values[i] * (weight / var[i]);
                self.v[slot] += weight * weight / var[i];
            }

            if amb.markers[i] != 0 {
                r = 0;
                r0 = i;
            } else {
                r += 1;
            }
        }
    }
}
