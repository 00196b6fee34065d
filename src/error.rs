// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and helper methods for Error handling

use thiserror::Error;

/// LpiError subtypes
#[derive(Error, Debug)]
pub enum LpiError {
    /// An error derived from `GdfFileError`.
    #[error("{0}")]
    GdfFile(#[from] crate::gdf_files::error::GdfFileError),

    /// An error derived from `TheoryMatrixError`.
    #[error("{0}")]
    TheoryMatrix(#[from] crate::theory_matrix::error::TheoryMatrixError),
}
