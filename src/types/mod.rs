// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use num_derive::FromPrimitive;
use std::fmt;


/// Byte order of the 16-bit integers inside a raw sample file.
///
#[repr(C)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
pub enum Endianness {
    /// Least significant byte first (the common acquisition-PC format)
    Little = 0,
    /// Most significant byte first
    Big = 1,
}

/// Implements fmt::Display for Endianness enum
///
/// # Arguments
///
/// * `f` - A fmt::Formatter
///
///
/// # Returns
///
/// * `fmt::Result` - Result of this method
///
///
impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Endianness::Little => "little endian",
                Endianness::Big => "big endian",
            }
        )
    }
}

/// Marker mode produced by the resampler for each output sample.
///
#[repr(C)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
pub enum MarkerMode {
    /// Output marker is set only when every contributing input marker is set
    AllSet = 0,
    /// Output marker carries the count of set input markers
    Count = 1,
}

/// Implements fmt::Display for MarkerMode enum
///
/// # Arguments
///
/// * `f` - A fmt::Formatter
///
///
/// # Returns
///
/// * `fmt::Result` - Result of this method
///
///
impl fmt::Display for MarkerMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MarkerMode::AllSet => "all markers set",
                MarkerMode::Count => "marker count",
            }
        )
    }
}
