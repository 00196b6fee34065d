// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors associated with theory matrix row generation.
*/
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TheoryMatrixError {
    #[error("No theory rows can be formed in samples {n_cur}..{n_end} (window ends at or before the highest range gate)")]
    EmptyBatch { n_cur: usize, n_end: usize },

    #[error("Range gate limits must hold at least two strictly increasing values, the lowest at least one")]
    InvalidRangeLimits,
}
