// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Average power and average lag profile estimation.

[`average_power`] produces the per-sample variance proxy used when
weighting measurements: pulses whose zero-lag range ambiguity functions
are identical are averaged together. [`average_profile`] averages a
lagged product stream over one repeated code cycle, which speeds up the
inversion of periodic codes.
*/
use log::debug;
use num_complex::Complex;

#[cfg(test)]
mod test;

/// Average signal power per sample, plus a quality metric.
///
#[derive(Debug, Clone)]
pub struct PowerProfile {
    /// Average power at each sample position
    pub power: Vec<f64>,
    /// Number of distinct pulse classes divided by the number of pulses.
    /// When this is large there are few redundant pulses and the power
    /// estimate is unreliable.
    pub quality: f64,
}

/// Average signal power in points with identical inter-pulse periods and
/// pulse shapes.
///
/// The transmitter mask in the `maxrange` samples preceding each falling
/// pulse edge is used as a pulse fingerprint; pulses with equal
/// fingerprints share a zero-lag range ambiguity function and their
/// signal powers are averaged sample by sample over the inter-pulse
/// intervals. Positions averaged from fewer than `nminave` samples fall
/// back to the grand mean power.
///
/// # Arguments
///
/// * `samples` - complex receiver samples.
///
/// * `tx` - transmitter marker vector.
///
/// * `rx` - receiver marker vector.
///
/// * `maxrange` - maximum range of the power profile, in samples.
///
/// * `nminave` - minimum number of averaged samples per position.
///
///
/// # Returns
///
/// * the average power profile and its quality metric.
///
pub fn average_power(
    samples: &[Complex<f64>],
    tx: &[i32],
    rx: &[i32],
    maxrange: usize,
    nminave: usize,
) -> PowerProfile {
    let nd = samples.len();

    // The fingerprint comparisons need the mask as strict 0/1
    let tx: Vec<i32> = tx.iter().map(|&m| i32::from(m != 0)).collect();

    let mut power = vec![0.0_f64; nd];
    let mut ptmp = vec![0.0_f64; nd];
    let mut nsamp = vec![0_usize; nd];

    let mut ptot = 0.0_f64;
    let mut ntot = 0_usize;

    // Locate all falling edges of pulses
    let mut pedges: Vec<usize> = Vec::new();
    for k in 0..nd.saturating_sub(1) {
        if tx[k] != 0 && tx[k + 1] == 0 {
            pedges.push(k);
        }
    }
    let nedges = pedges.len();

    // The first falling edge at least maxrange samples from the beginning
    let mut p1 = nedges;
    for (k, &edge) in pedges.iter().enumerate() {
        if edge > maxrange {
            p1 = k;
            break;
        }
    }

    // Give a shared index to every group of pulses with identical masks
    // in the maxrange samples before the falling edge
    let mut pinds = vec![-1_i32; nedges];
    let mut pindcur: i32 = 0;
    for k in p1..nedges {
        if pinds[k] < 0 {
            for i in k..nedges {
                if pinds[i] < 0 {
                    let mut sameamb = true;
                    for j in 0..maxrange {
                        if tx[pedges[k] - j] != tx[pedges[i] - j] {
                            sameamb = false;
                            break;
                        }
                    }
                    if sameamb {
                        pinds[i] = pindcur;
                    }
                }
            }
            pindcur += 1;
        }
    }

    // There may be an unindexed pulse just before p1; its preceding
    // window is shorter, compare over what exists
    if p1 > 0 {
        for i in p1..nedges {
            let mut sameamb = true;
            for j in 0..pedges[p1 - 1] {
                if tx[pedges[p1 - 1] - j] != tx[pedges[i] - j] {
                    sameamb = false;
                    break;
                }
            }
            if sameamb {
                pinds[p1 - 1] = pinds[i];
                break;
            }
        }
        // A new index if the pre-head pulse did not match any class.
        // Pulses before p1-1 are never used and need no index.
        if pinds[p1 - 1] < 0 {
            pinds[p1 - 1] = pindcur;
        }
    }

    let pindmax = pindcur;
    debug!(
        "average_power: {} pulse edges in {} classes",
        nedges, pindmax
    );

    // Start from the first falling edge, or one before if present
    if p1 > 0 {
        p1 -= 1;
    }

    // Average the power over all pulses of each class in turn; indices
    // are reset to -1 once their class has been processed
    for k in p1..nedges {
        if pinds[k] < 0 {
            continue;
        }

        for value in ptmp.iter_mut() {
            *value = 0.0;
        }
        for count in nsamp.iter_mut() {
            *count = 0;
        }

        for j in k..nedges {
            if pinds[j] != pinds[k] {
                continue;
            }
            // Distance to the next pulse end; pulse starts must not stop
            // the interval so that bistatic operation works
            let ippend = if j + 1 >= nedges {
                nd - pedges[j]
            } else {
                pedges[j + 1] - pedges[j]
            };
            for i in 0..ippend {
                let r = pedges[j] + i;
                // Points too close to the beginning have an unknown
                // ambiguity function and are cut off
                if r >= maxrange && rx[r] != 0 {
                    let p = samples[r].norm_sqr();
                    ptmp[i] += p;
                    nsamp[i] += 1;
                    ptot += p;
                    ntot += 1;
                }
            }
        }

        // Divide the summed powers by the number of summed samples;
        // poorly averaged points get a sentinel
        for i in 0..nd {
            if nsamp[i] >= nminave {
                ptmp[i] /= nsamp[i] as f64;
            } else {
                ptmp[i] = -1.0;
            }
        }

        // Copy the class profile to every pulse of the class
        let pind = pinds[k];
        for j in k..nedges {
            if pinds[j] != pind {
                continue;
            }
            let ippend = if j + 1 >= nedges {
                nd - pedges[j]
            } else {
                pedges[j + 1] - pedges[j]
            };
            for i in 0..ippend {
                power[pedges[j] + i] = ptmp[i];
            }
            pinds[j] = -1;
        }
    }

    // Points without enough averaged samples fall back to the grand mean
    let grand_mean = ptot / ntot as f64;
    for value in power.iter_mut() {
        if *value < 0.0 {
            *value = grand_mean;
        }
    }

    PowerProfile {
        power,
        quality: pindmax as f64 / nedges as f64,
    }
}

/// Average a lagged product stream over one repeated code cycle of
/// `n_code` inter-pulse periods, in place.
///
/// Two indices walk the stream in lock step: the write index resets to
/// the first pulse start after every `n_code` inter-pulse periods while
/// the read index continues, so samples at the same position within the
/// code cycle accumulate into the same slot. A first pass accumulates,
/// a second pass overwrites each sample with its average. Sync gaps
/// between pulses are absorbed by skipping unmarked samples before each
/// pulse start.
///
/// # Arguments
///
/// * `values` - complex lagged product vector, averaged in place.
///
/// * `markers` - marker vector for `values`.
///
/// * `n_code` - code cycle length in inter-pulse periods.
///
pub fn average_profile(values: &mut [Complex<f64>], markers: &[i32], n_code: usize) {
    let nd = values.len().min(markers.len());

    let mut aver = vec![Complex::new(0.0, 0.0); nd];
    let mut nave = vec![0_usize; nd];

    // Accumulation pass
    walk_code_cycle(markers, nd, n_code, |ind1, ind2| {
        aver[ind1] += values[ind2];
        nave[ind1] += 1;
    });

    // Divide the summed values by the number of summed pulses
    for (sum, &count) in aver.iter_mut().zip(nave.iter()) {
        if count > 0 {
            *sum /= count as f64;
        }
    }

    // Overwrite pass: copy the averages back over the whole stream
    walk_code_cycle(markers, nd, n_code, |ind1, ind2| {
        values[ind2] = aver[ind1];
    });
}

/// Walk a marker stream with a read index covering the whole stream and
/// a write index that resets to the first pulse start every `n_code`
/// inter-pulse periods, calling `visit(write, read)` at every sample.
///
/// The walk alternates between a both-inside-a-pulse phase and a
/// both-between-pulses phase; before each new pulse both indices skip
/// unmarked samples independently, which absorbs sync gaps where the
/// two desynchronise.
fn walk_code_cycle<F: FnMut(usize, usize)>(
    markers: &[i32],
    nd: usize,
    n_code: usize,
    mut visit: F,
) {
    let mut ind1 = 0;
    let mut ind2 = 0;

    // Search for the start of the first pulse
    while ind1 < nd && markers[ind1] == 0 {
        ind1 += 1;
    }
    while ind2 < nd && markers[ind2] == 0 {
        ind2 += 1;
    }
    let mut ipp_count = 0;

    while ind2 < nd {
        // Both indices are at pulse starts; advance until both pulses
        // have ended
        while markers[ind1] != 0 || markers[ind2] != 0 {
            visit(ind1, ind2);
            ind1 += 1;
            ind2 += 1;
            if ind2 == nd {
                return;
            }
        }

        // Advance until either index hits the next pulse
        while markers[ind1] == 0 && markers[ind2] == 0 {
            visit(ind1, ind2);
            ind1 += 1;
            ind2 += 1;
            if ind2 == nd {
                return;
            }
        }

        // Make sure both indices point to a pulse start, skipping
        // possible sync times
        while ind1 < nd && markers[ind1] == 0 {
            ind1 += 1;
        }
        while ind2 < nd && markers[ind2] == 0 {
            ind2 += 1;
        }
        if ind2 == nd {
            return;
        }

        ipp_count += 1;
        if ipp_count == n_code {
            ipp_count = 0;
            ind1 = 0;
            while ind1 < nd && markers[ind1] == 0 {
                ind1 += 1;
            }
        }
    }
}
