// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Signal preparation: frequency mixing, marker edge adjustment and
boxcar resampling.

These operations run once per integration window, in the order
mix / adjust / resample, before any lagged products are formed.
[`prepare_data`] applies all three and zeroes samples at unusable
positions.
*/
use log::debug;
use num_complex::Complex;

use crate::types::MarkerMode;


/// Tolerance for deciding that `frequency * k` is an integer during
/// mixing-table period detection. The exact-match test of older
/// implementations almost never fires for frequencies that went through
/// decimal parsing, so a small absolute tolerance is used instead.
pub const MIX_PERIOD_EPS: f64 = 1e-12;

/// Resampling parameters. The filter is a boxcar of `nfilter` units on a
/// virtual grid upsampled by `nup`, so the decimation ratio is
/// `nfilter / nup` original samples per output sample.
///
#[derive(Debug, Clone, Copy)]
pub struct ResampleParams {
    /// Upsampling factor of the virtual grid
    pub nup: usize,
    /// Boxcar length in upsampled units
    pub nfilter: usize,
    /// Decimation start index in original samples
    pub nfirst: usize,
    /// Additional start offset in upsampled units
    pub nfirstfrac: usize,
    /// How the output markers combine the contributing input markers
    pub marker_mode: MarkerMode,
}

/// Parameters of the full preparation pass.
///
#[derive(Debug, Clone, Copy)]
pub struct PrepareParams {
    /// Mixing frequency in cycles per sample
    pub frequency: f64,
    /// Marker shifts at rising and falling edges, in samples
    pub shifts: [isize; 2],
    /// Resampling parameters
    pub resample: ResampleParams,
}

/// Rotate each complex sample `k` by `exp(2*pi*i*frequency*k)`.
///
/// The rotation coefficients are cyclic whenever `frequency * P` is an
/// integer for some period `P <= N`; the smallest such period is detected
/// and a coefficient table of that length is reused cyclically. Radar
/// controllers tend to use nice rational frequencies, so the table is
/// usually short. An irrational frequency degrades to a full-length table.
///
/// A period of one means every rotation is a whole number of cycles and
/// the operation is a no-op.
///
/// # Arguments
///
/// * `samples` - complex samples, rotated in place.
///
/// * `frequency` - mixing frequency in cycles per sample.
///
pub fn mix_frequency(samples: &mut [Complex<f64>], frequency: f64) {
    let n = samples.len();

    // Find the coefficient cycle length
    let mut ncycle = n;
    for k in 1..n {
        let prod = frequency * k as f64;
        if (prod - prod.round()).abs() <= MIX_PERIOD_EPS {
            ncycle = k;
            break;
        }
    }

    // A cycle length of one would not change anything
    if ncycle == 1 {
        return;
    }

    debug!("mix_frequency: cycle length {} of {} samples", ncycle, n);

    // Tabulate the cyclic coefficients
    let table: Vec<Complex<f64>> = (0..ncycle)
        .map(|k| {
            let arg = 2.0 * std::f64::consts::PI * frequency * k as f64;
            Complex::new(arg.cos(), arg.sin())
        })
        .collect();

    let mut nc = 0;
    for sample in samples.iter_mut() {
        *sample *= table[nc];
        nc += 1;
        if nc == ncycle {
            nc = 0;
        }
    }
}

/// Shift the rising edges of a marker vector by `shifts[0]` samples and the
/// falling edges by `shifts[1]` samples, both towards larger indices.
/// Negative shifts are allowed.
///
/// The rising-edge shift translates the whole vector, repeating the
/// boundary sample on the vacated side; the falling-edge shift is then the
/// remainder `shifts[1] - shifts[0]`, applied only at pulse tails. Marker
/// values past `lasttrue + shifts[1]` are forced to zero afterwards, so the
/// last usable index never moves further than the falling-edge shift.
///
/// # Arguments
///
/// * `markers` - marker vector, adjusted in place.
///
/// * `shifts` - shifts at rising and falling edges, in samples.
///
pub fn index_adjust(markers: &mut [i32], shifts: [isize; 2]) {
    let nd = markers.len() as isize;
    if nd == 0 {
        return;
    }
    let s0 = shifts[0];

    // Find the last true index in the whole vector, it is needed for the
    // tail fix-up at the end
    let mut lasttrue: isize = 0;
    for k in (0..nd).rev() {
        if markers[k as usize] != 0 {
            lasttrue = k;
            break;
        }
    }

    // The shift on rising edges is done by shifting the whole vector
    if s0 < 0 {
        let last = markers[(nd - 1) as usize];
        for k in 0..(nd + s0).max(0) {
            markers[k as usize] = markers[(k - s0) as usize];
        }
        // The last value is repeated in the remaining points
        for k in (nd + s0).max(0)..nd {
            markers[k as usize] = last;
        }
    }
    if s0 > 0 {
        let first = markers[0];
        for k in (s0.min(nd)..nd).rev() {
            markers[k as usize] = markers[(k - s0) as usize];
        }
        // The first value is repeated in the first points
        for k in 1..s0.min(nd) {
            markers[k as usize] = first;
        }
    }

    // The rising-edge shift already moved the falling edges by s0
    let s1 = shifts[1] - s0;

    // Shift falling edges towards smaller indices: cut the pulse tails
    if s1 < 0 {
        let mut ncut: isize = 0;
        for k in (0..nd).rev() {
            if markers[k as usize] == 0 {
                ncut = 0;
            } else {
                ncut -= 1;
            }
            if ncut >= s1 {
                markers[k as usize] = 0;
            }
        }
    }

    // Shift falling edges towards larger indices: extend the pulse tails
    if s1 > 0 {
        let mut nadd: isize = 0;
        for k in 0..nd {
            if markers[k as usize] == 0 {
                nadd += 1;
            } else {
                nadd = 0;
            }
            if nadd <= s1 {
                markers[k as usize] = 1;
            }
        }
    }

    // There may now be errors at the very end of the vector, correct
    // using the stored index lasttrue
    for k in (lasttrue + shifts[1] + 1).max(0)..nd {
        markers[k as usize] = 0;
    }
}

/// Resample with a boxcar filter of `nfilter` units on a virtual grid
/// upsampled by `nup`, decimating both the complex samples and the
/// markers consistently. Reduces to plain block summing when `nfilter`
/// is an integer multiple of `nup`. The final sample rate must be
/// smaller than or equal to the original one.
///
/// Output markers are either the product of all contributing input
/// markers ([`MarkerMode::AllSet`]) or their sum ([`MarkerMode::Count`]).
///
/// The vectors are overwritten in place from index 0; the caller
/// truncates to the returned length.
///
/// # Arguments
///
/// * `samples` - complex samples, overwritten in place.
///
/// * `markers` - marker vector, overwritten in place.
///
/// * `params` - resampling parameters.
///
///
/// # Returns
///
/// * the number of valid output samples.
///
pub fn resample(
    samples: &mut [Complex<f64>],
    markers: &mut [i32],
    params: &ResampleParams,
) -> usize {
    let nd = samples.len().min(markers.len());
    let nu = params.nup;
    let nf = params.nfilter;

    // i is the current filter start point in upsampled units, j the
    // current point inside the boxcar, k the current point in the
    // original vector and l the current point in the decimated vector.
    let mut i = params.nfirst * nu;
    // Increment with nu-1: the full sample at k is used in any case, so
    // the first output is off when nfirstfrac != 0, which cannot be
    // helped at this point.
    let mut j = params.nfirstfrac + nu - 1;
    let mut k = params.nfirst;
    let mut l = 0;

    let mut tmpsum = Complex::new(0.0, 0.0);
    let mut tmp_all: i32 = 1;
    let mut tmp_count: i32 = 0;
    let mut frac = 0.0;

    // Current filter start + filter length within the data
    while (i + nf) / nu <= nd {
        // One filter length of data
        while j < nf {
            tmpsum += samples[k];
            tmp_all *= markers[k];
            tmp_count += markers[k];
            // Jump to the next point that actually needs to be added
            j += nu;
            k += 1;
        }

        // Fraction of sample k that belongs to this output point; the
        // boxcar boundary either falls exactly between samples or the
        // whole sample carries over
        frac = if j - nf + 1 == nu { 1.0 } else { 0.0 };

        // k may have passed the end of the data
        if k < nd {
            let sample_k = samples[k];
            let marker_k = markers[k];
            // Add the fraction that belongs to the k'th point
            tmpsum += sample_k * (1.0 - frac);
            if frac < 0.99999 {
                tmp_all *= marker_k;
                tmp_count += marker_k;
            }
            // The sum is ready, store it as the l'th output sample
            samples[l] = tmpsum;
            markers[l] = match params.marker_mode {
                MarkerMode::AllSet => tmp_all,
                MarkerMode::Count => tmp_count,
            };
            // Put the remaining fraction of sample k into the next sum
            tmpsum = sample_k * frac;
            tmp_all = if frac < 0.00001 { 1 } else { marker_k };
            tmp_count = if frac < 0.00001 { 0 } else { marker_k };
            // One filter length backwards; sample k is already summed,
            // jump past it
            j -= nf;
            j += nu;
            l += 1;
        }

        // i and k are incremented also at end of data to exit the loop
        i += nf;
        k += 1;
    }

    // If the loop ended exactly at the end of data with a full carry,
    // one more output sample is pending
    if k == nd + 1 && frac > 0.9999999 {
        samples[l] = tmpsum;
        markers[l] = match params.marker_mode {
            MarkerMode::AllSet => tmp_all,
            MarkerMode::Count => tmp_count,
        };
        l += 1;
    }

    l
}

/// Frequency mixing, marker adjustments and resampling in a single pass,
/// with samples zeroed wherever the final marker is zero and both vectors
/// truncated to the resampled length.
///
/// # Arguments
///
/// * `samples` - complex samples, prepared in place.
///
/// * `markers` - marker vector for `samples`, prepared in place.
///
/// * `params` - preparation parameters.
///
pub fn prepare_data(
    samples: &mut Vec<Complex<f64>>,
    markers: &mut Vec<i32>,
    params: &PrepareParams,
) {
    mix_frequency(samples, params.frequency);
    index_adjust(markers, params.shifts);
    let new_len = resample(samples, markers, &params.resample);
    samples.truncate(new_len);
    markers.truncate(new_len);

    // Downstream stages assume zeroes at every unusable position
    for (sample, &marker) in samples.iter_mut().zip(markers.iter()) {
        if marker == 0 {
            *sample = Complex::new(0.0, 0.0);
        }
    }
}
