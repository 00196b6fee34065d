// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors associated with reading in raw gdf sample files.
*/
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GdfFileError {
    #[error("No gdf files were supplied")]
    NoGdfFiles,

    #[error("Invalid sample range {first}..={last} in {filename}")]
    InvalidSampleRange {
        filename: String,
        first: u64,
        last: u64,
    },

    #[error("Could not open gdf file {filename}: {source}")]
    OpenFailed {
        filename: String,
        source: std::io::Error,
    },

    #[error("Could not seek to sample {first_sample} in {filename}: {source}")]
    SeekFailed {
        filename: String,
        first_sample: u64,
        source: std::io::Error,
    },

    #[error("Short read from {filename}: expected {expected} bytes, got {got}")]
    ShortRead {
        filename: String,
        expected: usize,
        got: usize,
    },

    #[error("Read error from {filename}: {source}")]
    ReadFailed {
        filename: String,
        source: std::io::Error,
    },
}
