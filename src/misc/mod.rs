// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
General helper/utility methods
*/


/// Given the matrix dimension, calculate the length of the packed upper
/// triangle vector (diagonal included).
///
/// # Arguments
///
/// * `n` - matrix dimension
///
///
/// # Returns
///
/// * total number of stored elements n(n+1)/2
///
pub fn upper_triangle_len(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Given element indices (i,j) with j >= i, return the index into the packed
/// row-major upper triangle of an n x n matrix e.g. (where N is the dimension)
/// 0,0
/// 0,1
/// ...
/// 0,N-1
/// 1,1
/// 1,2
/// ...
/// 1,N-1
/// ...
/// N-1,N-1
///
/// # Arguments
///
/// * `i` - row index.
///
/// * `j` - column index, `j >= i`.
///
/// * `n` - matrix dimension.
///
///
/// # Returns
///
/// * index of (i,j) in the packed vector.
///
pub fn upper_triangle_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i <= j && j < n);
    i * n - (i * i + i) / 2 + j
}
