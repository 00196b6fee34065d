// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Functions for reading raw gdf sample files.

A gdf file is a stream of 4-byte records, each holding two 16-bit signed
integers in (I, Q) order. The lowest bit of I carries the pulse-per-second
marker and the lowest bit of Q the transmitter-on marker; both bits are
masked out of the numeric sample after extraction.
*/
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;
use num_complex::Complex;

use crate::types::Endianness;

pub mod error;
use error::GdfFileError;

#[cfg(test)]
mod test;

/// One contiguous slice of samples to read from a gdf file.
///
#[derive(Debug, Clone)]
pub struct GdfFileSlice {
    /// Path to the gdf file
    pub filename: PathBuf,
    /// Index of the first sample to read (inclusive)
    pub first_sample: u64,
    /// Index of the last sample to read (inclusive)
    pub last_sample: u64,
}

impl GdfFileSlice {
    /// Create a new slice descriptor.
    ///
    /// # Arguments
    ///
    /// * `filename` - path to the gdf file.
    ///
    /// * `first_sample` - index of the first sample to read (inclusive).
    ///
    /// * `last_sample` - index of the last sample to read (inclusive).
    ///
    ///
    /// # Returns
    ///
    /// * a populated GdfFileSlice.
    ///
    pub fn new<P: AsRef<Path>>(filename: P, first_sample: u64, last_sample: u64) -> Self {
        GdfFileSlice {
            filename: filename.as_ref().to_path_buf(),
            first_sample,
            last_sample,
        }
    }

    /// Number of samples covered by this slice.
    pub fn num_samples(&self) -> usize {
        (self.last_sample - self.first_sample + 1) as usize
    }
}

/// Voltage samples and marker bits read from a set of gdf file slices.
///
#[derive(Debug, Clone, Default)]
pub struct GdfData {
    /// Complex voltage samples with the marker bits masked out
    pub samples: Vec<Complex<f64>>,
    /// Lowest bits of the real parts (pulse-per-second markers)
    pub pps: Vec<i32>,
    /// Lowest bits of the imaginary parts (transmitter-on markers)
    pub tx: Vec<i32>,
}

impl GdfData {
    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Read IQ data from a concatenation of gdf file slices.
///
/// Succeeds only if every file opens and every requested byte is read;
/// a short read is surfaced as an error, not retried, and the partially
/// populated output is discarded.
///
/// # Arguments
///
/// * `slices` - the `(path, first_sample, last_sample)` triples to read,
///   concatenated in order.
///
/// * `endianness` - byte order of the 16-bit integers in the files.
///
///
/// # Returns
///
/// * A Result containing the samples and both marker streams if Ok.
///
pub fn read_gdf_data(
    slices: &[GdfFileSlice],
    endianness: Endianness,
) -> Result<GdfData, GdfFileError> {
    if slices.is_empty() {
        return Err(GdfFileError::NoGdfFiles);
    }

    let num_samples: usize = slices
        .iter()
        .map(|s| {
            if s.last_sample < s.first_sample {
                Err(GdfFileError::InvalidSampleRange {
                    filename: s.filename.display().to_string(),
                    first: s.first_sample,
                    last: s.last_sample,
                })
            } else {
                Ok(s.num_samples())
            }
        })
        .sum::<Result<usize, GdfFileError>>()?;

    let mut data = GdfData {
        samples: Vec::with_capacity(num_samples),
        pps: Vec::with_capacity(num_samples),
        tx: Vec::with_capacity(num_samples),
    };

    for slice in slices {
        read_gdf_slice(slice, endianness, &mut data)?;
    }

    Ok(data)
}

/// Read one gdf file slice, appending to the output vectors.
///
/// # Arguments
///
/// * `slice` - the slice to read.
///
/// * `endianness` - byte order of the 16-bit integers in the file.
///
/// * `data` - output vectors, appended to in place.
///
///
/// # Returns
///
/// * A Result; Err if the file could not be opened or the slice was short.
///
fn read_gdf_slice(
    slice: &GdfFileSlice,
    endianness: Endianness,
    data: &mut GdfData,
) -> Result<(), GdfFileError> {
    let filename = slice.filename.display().to_string();

    let mut file = File::open(&slice.filename).map_err(|source| GdfFileError::OpenFailed {
        filename: filename.clone(),
        source,
    })?;

    // Each sample is one 4-byte record
    file.seek(SeekFrom::Start(slice.first_sample * 4))
        .map_err(|source| GdfFileError::SeekFailed {
            filename: filename.clone(),
            first_sample: slice.first_sample,
            source,
        })?;

    let expected = slice.num_samples() * 4;
    let mut buffer = vec![0_u8; expected];
    let mut got = 0;
    while got < expected {
        match file.read(&mut buffer[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(GdfFileError::ReadFailed {
                    filename: filename.clone(),
                    source,
                })
            }
        }
    }
    if got < expected {
        return Err(GdfFileError::ShortRead {
            filename,
            expected,
            got,
        });
    }

    debug!(
        "read_gdf_slice: {} samples {}..={} ({} bytes)",
        filename, slice.first_sample, slice.last_sample, expected
    );

    for record in buffer.chunks_exact(4) {
        let (mut i_val, mut q_val) = match endianness {
            Endianness::Big => (
                i16::from_be_bytes([record[0], record[1]]),
                i16::from_be_bytes([record[2], record[3]]),
            ),
            Endianness::Little => (
                i16::from_le_bytes([record[0], record[1]]),
                i16::from_le_bytes([record[2], record[3]]),
            ),
        };

        // Lowest bits carry the markers
        data.pps.push((i_val & 1) as i32);
        data.tx.push((q_val & 1) as i32);

        // Mask the marker bits out of the numeric sample
        i_val &= !1;
        q_val &= !1;

        data.samples
            .push(Complex::new(f64::from(i_val), f64::from(q_val)));
    }

    Ok(())
}
