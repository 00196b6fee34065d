// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`lpilib` is a numerical core for lag profile inversion of pulsed
incoherent scatter radar measurements.

Raw I/Q voltage samples and their transmitter/receiver marker streams go
in; for every selected temporal lag a sparse complex linear inverse
problem comes out, accumulated incrementally as normal equations (the
upper triangular Fisher information matrix and its right-hand side) over
arbitrarily long data spans. The outer driver chooses integration
windows, lags, range gates and filter parameters, and factors the
accumulated matrix; this crate does everything in between:

1. [`gdf_files`] reads interleaved 16-bit I/Q records with embedded
   timing and transmitter marker bits.
2. [`prepare`] mixes, edge-adjusts and resamples a buffer.
3. [`averaging`] estimates per-sample signal power and code-cycle
   average profiles.
4. [`lag_profile`] builds lagged products and range ambiguity functions.
5. [`theory_matrix`] turns them into sparse theory rows with a sliding
   range-gate accumulator.
6. [`fisher`] folds rows into the Fisher matrix and measurement vector.
7. [`clutter`] measures and subtracts ground clutter with the same
   machinery, localised to the near ranges.
*/

pub mod averaging;
pub mod clutter;
pub mod error;
pub mod fisher;
pub mod gdf_files;
pub mod lag_profile;
pub mod misc;
pub mod prepare;
pub mod sample_buffer;
pub mod theory_matrix;
pub mod types;

// Re-exports.
pub use averaging::{average_power, average_profile, PowerProfile};
pub use clutter::{clutter_meas, clutter_subtract};
pub use error::LpiError;
pub use fisher::{FisherAccumulator, WeightedProfileSum};
pub use gdf_files::{read_gdf_data, GdfData, GdfFileSlice};
pub use lag_profile::{
    lagged_products, lagged_products_batch, lagged_products_into, lagged_products_real,
    range_ambiguity, LagProfile, AMB_N_INTERP,
};
pub use prepare::{
    index_adjust, mix_frequency, prepare_data, resample, PrepareParams, ResampleParams,
};
pub use sample_buffer::SampleBuffer;
pub use theory_matrix::{theory_rows, TheoryRowBatch, TheoryRowScan};
pub use types::{Endianness, MarkerMode};
