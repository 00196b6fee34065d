// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Lagged products and range ambiguity functions.

A lagged product stream at lag `l` is `p[k] = x1[k] * conj(x2[k + l])`
with a marker that is set only where both input markers are set. The
range ambiguity variant computes the same quantity on two transmitter
envelopes with linear sub-sample interpolation, which reduces
quantisation bias when the lag is small relative to the pulse length.

Values are written only at marked positions; unmarked positions may hold
stale data from an earlier lag, so consumers must always check the
marker before reading a value.
*/
use num_complex::Complex;
use rayon::prelude::*;


/// Number of interpolation points per half sample interval in the range
/// ambiguity calculation.
pub const AMB_N_INTERP: usize = 5;

/// A lagged product (or range ambiguity) stream with its marker vector.
///
/// Both vectors have the length of the shorter input; only the first
/// `len - lag` entries can carry products and the trailing `lag` markers
/// are always zero.
///
#[derive(Debug, Clone, Default)]
pub struct LagProfile {
    /// Complex products; valid only where the marker is non-zero
    pub values: Vec<Complex<f64>>,
    /// Product of the two input markers at each position
    pub markers: Vec<i32>,
}

impl LagProfile {
    /// An all-zero profile of the given length.
    pub fn zeroed(len: usize) -> Self {
        LagProfile {
            values: vec![Complex::new(0.0, 0.0); len],
            markers: vec![0; len],
        }
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Calculate lagged products of two signals into a freshly allocated
/// profile.
///
/// # Arguments
///
/// * `x1` - first complex signal.
///
/// * `x2` - second complex signal.
///
/// * `tx1` - marker vector for `x1`.
///
/// * `tx2` - marker vector for `x2`.
///
/// * `lag` - the lag in samples.
///
///
/// # Returns
///
/// * the lagged product profile, of the shorter input length.
///
pub fn lagged_products(
    x1: &[Complex<f64>],
    x2: &[Complex<f64>],
    tx1: &[i32],
    tx2: &[i32],
    lag: usize,
) -> LagProfile {
    let mut profile = LagProfile::zeroed(x1.len().min(x2.len()));
    lagged_products_into(x1, x2, tx1, tx2, lag, &mut profile);
    profile
}

/// Calculate lagged products of two signals, overwriting an existing
/// profile. The profile must be at least as long as the shorter input;
/// reusing one profile across lags avoids reallocation, at the price of
/// stale values at unmarked positions.
///
/// A lag longer than the data is a no-op apart from the marker zeroing.
///
/// # Arguments
///
/// * `x1` - first complex signal.
///
/// * `x2` - second complex signal.
///
/// * `tx1` - marker vector for `x1`.
///
/// * `tx2` - marker vector for `x2`.
///
/// * `lag` - the lag in samples.
///
/// * `profile` - output profile, overwritten at marked positions.
///
pub fn lagged_products_into(
    x1: &[Complex<f64>],
    x2: &[Complex<f64>],
    tx1: &[i32],
    tx2: &[i32],
    lag: usize,
    profile: &mut LagProfile,
) {
    let len = x1.len().min(x2.len());
    let npr = len.saturating_sub(lag);

    for k in 0..npr {
        let marker = tx1[k] * tx2[k + lag];
        profile.markers[k] = marker;
        // Multiply the data points only where the marker is set
        if marker != 0 {
            profile.values[k] = x1[k] * x2[k + lag].conj();
        }
    }

    // The marker is forced to zero where no product can be calculated
    for marker in profile.markers[npr..len].iter_mut() {
        *marker = 0;
    }
}

/// Real-valued lagged products for variance estimation. No marker
/// vectors; those are carried with the complex streams.
///
/// # Arguments
///
/// * `r1` - first real signal.
///
/// * `r2` - second real signal.
///
/// * `lag` - the lag in samples.
///
///
/// # Returns
///
/// * the real products `r1[k] * r2[k + lag]`.
///
pub fn lagged_products_real(r1: &[f64], r2: &[f64], lag: usize) -> Vec<f64> {
    let npr = r1.len().min(r2.len()).saturating_sub(lag);
    (0..npr).map(|k| r1[k] * r2[k + lag]).collect()
}

/// Range ambiguity function of two transmitter envelopes with linear
/// interpolation.
///
/// Each pair of factors is interpolated to `2 * AMB_N_INTERP` sub-samples
/// centred on the current sample, the sub-sample products are averaged
/// and written as one output. Interpolation windows that fall at a buffer
/// boundary are zero-filled on the out-of-range side.
///
/// # Arguments
///
/// * `x1` - first complex transmitter envelope.
///
/// * `x2` - second complex transmitter envelope.
///
/// * `tx1` - marker vector for `x1`.
///
/// * `tx2` - marker vector for `x2`.
///
/// * `lag` - the lag in samples.
///
///
/// # Returns
///
/// * the range ambiguity profile, of the shorter input length.
///
pub fn range_ambiguity(
    x1: &[Complex<f64>],
    x2: &[Complex<f64>],
    tx1: &[i32],
    tx2: &[i32],
    lag: usize,
) -> LagProfile {
    let len = x1.len().min(x2.len());
    let npr = len.saturating_sub(lag);
    let ninterp = AMB_N_INTERP;
    let nsub = 2 * ninterp;

    let mut profile = LagProfile::zeroed(len);

    let mut tmp1 = vec![Complex::new(0.0, 0.0); nsub];
    let mut tmp2 = vec![Complex::new(0.0, 0.0); nsub];

    for k in 0..npr {
        let marker = tx1[k] * tx2[k + lag];
        profile.markers[k] = marker;
        if marker == 0 {
            continue;
        }

        for value in tmp1.iter_mut().chain(tmp2.iter_mut()) {
            *value = Complex::new(0.0, 0.0);
        }

        // Linear interpolation towards the previous data point
        if k > 1 {
            for i in 0..ninterp {
                let weight = 1.0 - i as f64 / nsub as f64;
                tmp1[i] = x1[k - 1] + (x1[k] - x1[k - 1]) * weight;
                tmp2[i] = x2[k - 1 + lag] + (x2[k + lag] - x2[k - 1 + lag]) * weight;
            }
        }
        // Linear interpolation towards the next data point
        if k + 1 < x1.len() && k + 1 + lag < x2.len() {
            for i in 0..ninterp {
                let weight = i as f64 / nsub as f64;
                tmp1[i + ninterp] = x1[k] + (x1[k + 1] - x1[k]) * weight;
                tmp2[i + ninterp] = x2[k + lag] + (x2[k + 1 + lag] - x2[k + lag]) * weight;
            }
        }

        // Average the products of the interpolated data
        let mut sum = Complex::new(0.0, 0.0);
        for (a, b) in tmp1.iter().zip(tmp2.iter()) {
            sum += *a * b.conj();
        }
        profile.values[k] = sum / nsub as f64;
    }

    for marker in profile.markers[npr..len].iter_mut() {
        *marker = 0;
    }

    profile
}

/// Calculate lagged products of one signal with itself for a set of
/// independent lags in parallel.
///
/// # Arguments
///
/// * `x` - complex signal.
///
/// * `tx` - marker vector for `x`.
///
/// * `lags` - the lags to compute, one profile each.
///
///
/// # Returns
///
/// * one lagged product profile per requested lag, in input order.
///
pub fn lagged_products_batch(x: &[Complex<f64>], tx: &[i32], lags: &[usize]) -> Vec<LagProfile> {
    lags.par_iter()
        .map(|&lag| lagged_products(x, x, tx, tx, lag))
        .collect()
}
