// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Unit tests for average power and average profile estimation
*/
#[cfg(test)]
use super::*;

#[test]
fn test_average_power_two_pulse_classes() {
    let nd = 30;
    let mut tx = vec![0; nd];
    // Two pulses of different lengths: their masks before the falling
    // edges differ, so they form two classes
    tx[5] = 1;
    tx[6] = 1; // falling edge at 6
    tx[16] = 1;
    tx[17] = 1;
    tx[18] = 1; // falling edge at 18
    let rx = vec![1; nd];

    // Unit amplitude everywhere except the second inter-pulse interval
    let samples: Vec<Complex<f64>> = (0..nd)
        .map(|k| {
            if k >= 19 {
                Complex::new(3.0, 0.0)
            } else {
                Complex::new(1.0, 0.0)
            }
        })
        .collect();

    let profile = average_power(&samples, &tx, &rx, 4, 1);

    // Two classes over two pulses
    assert_eq!(profile.quality, 1.0);
    // First class covers samples 6..18, second 18..30
    assert_eq!(profile.power[8], 1.0);
    assert_eq!(profile.power[17], 1.0);
    assert_eq!(profile.power[20], 9.0);
    assert_eq!(profile.power[29], 9.0);
    // Positions before the first usable edge are never assigned
    assert_eq!(profile.power[3], 0.0);
}

#[test]
fn test_average_power_averages_identical_pulses() {
    let nd = 40;
    let mut tx = vec![0; nd];
    // Two identical pulses
    tx[6] = 1;
    tx[7] = 1; // falling edge at 7
    tx[18] = 1;
    tx[19] = 1; // falling edge at 19
    let rx = vec![1; nd];

    // Powers 1 in the first interval, 9 in the second; the class average
    // of the shared positions is 5
    let samples: Vec<Complex<f64>> = (0..nd)
        .map(|k| {
            if k >= 19 {
                Complex::new(3.0, 0.0)
            } else {
                Complex::new(1.0, 0.0)
            }
        })
        .collect();

    let profile = average_power(&samples, &tx, &rx, 4, 2);

    // One class over two pulses
    assert_eq!(profile.quality, 0.5);
    // Position i is averaged over samples 7+i and 19+i while both exist
    assert_eq!(profile.power[8], 5.0);
    assert_eq!(profile.power[20], 5.0);
}

#[test]
fn test_average_power_sentinel_falls_back_to_grand_mean() {
    let nd = 24;
    let mut tx = vec![0; nd];
    tx[6] = 1;
    tx[7] = 1; // single pulse, single class
    let rx = vec![1; nd];
    let samples: Vec<Complex<f64>> = (0..nd)
        .map(|k| Complex::new(if k % 2 == 0 { 1.0 } else { 2.0 }, 0.0))
        .collect();

    // Every position is averaged from one sample only, below nminave,
    // so the whole interval falls back to the grand mean
    let profile = average_power(&samples, &tx, &rx, 4, 2);

    let grand_mean: f64 =
        (7..nd).map(|k| samples[k].norm_sqr()).sum::<f64>() / (nd - 7) as f64;
    for k in 7..nd {
        assert!((profile.power[k] - grand_mean).abs() < 1e-12);
    }
}

#[test]
fn test_average_profile_code_cycle_averaging() {
    // Pulses of two samples every five, code cycle of two IPPs: samples
    // ten apart share a slot
    let nd = 20;
    let markers: Vec<i32> = (0..nd).map(|k| i32::from(k % 5 < 2)).collect();
    let mut values: Vec<Complex<f64>> =
        (0..nd).map(|k| Complex::new(k as f64, 0.0)).collect();

    average_profile(&mut values, &markers, 2);

    for k in 0..10 {
        let expected = Complex::new(k as f64 + 5.0, 0.0);
        assert_eq!(values[k], expected, "slot {}", k);
        assert_eq!(values[k + 10], expected, "slot {}", k + 10);
    }
}

#[test]
fn test_average_profile_long_code_is_identity() {
    // With a code cycle longer than the data every slot is averaged from
    // a single sample, leaving the values unchanged
    let nd = 20;
    let markers: Vec<i32> = (0..nd).map(|k| i32::from(k % 5 < 2)).collect();
    let original: Vec<Complex<f64>> = (0..nd)
        .map(|k| Complex::new(k as f64, -(k as f64)))
        .collect();
    let mut values = original.clone();

    average_profile(&mut values, &markers, 100);

    assert_eq!(values, original);
}

#[test]
fn test_average_profile_no_pulses_is_noop() {
    let nd = 10;
    let markers = vec![0; nd];
    let original: Vec<Complex<f64>> =
        (0..nd).map(|k| Complex::new(1.0, k as f64)).collect();
    let mut values = original.clone();

    average_profile(&mut values, &markers, 4);

    assert_eq!(values, original);
}
