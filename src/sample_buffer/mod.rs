// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The in-memory unit of ownership of the processing pipeline: complex voltage
samples with their transmitter-on and receiver-on marker streams.
*/
use num_complex::Complex;

use crate::error::LpiError;
use crate::gdf_files::{read_gdf_data, GdfData, GdfFileSlice};
use crate::types::Endianness;

#[cfg(test)]
mod test;

/// Complex samples plus transmitter and receiver marker streams of equal
/// length. Pipeline stages either overwrite the buffer in place or shrink
/// it with [`SampleBuffer::truncate`].
///
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    /// Complex voltage samples
    pub samples: Vec<Complex<f64>>,
    /// Transmitter-on markers (non-zero is true; values may be counts)
    pub tx: Vec<i32>,
    /// Receiver-usable markers (non-zero is true; values may be counts)
    pub rx: Vec<i32>,
}

impl SampleBuffer {
    /// Assemble a buffer from its three streams.
    ///
    /// # Arguments
    ///
    /// * `samples` - complex voltage samples.
    ///
    /// * `tx` - transmitter-on markers, same length as `samples`.
    ///
    /// * `rx` - receiver-usable markers, same length as `samples`.
    ///
    ///
    /// # Returns
    ///
    /// * a populated SampleBuffer.
    ///
    pub fn new(samples: Vec<Complex<f64>>, tx: Vec<i32>, rx: Vec<i32>) -> Self {
        assert_eq!(samples.len(), tx.len());
        assert_eq!(samples.len(), rx.len());
        SampleBuffer { samples, tx, rx }
    }

    /// Build a buffer from loader output, marking every sample as
    /// receiver-usable. The driver masks receiver protection windows
    /// afterwards.
    ///
    /// # Arguments
    ///
    /// * `data` - samples and marker bits from [`crate::gdf_files::read_gdf_data`].
    ///
    ///
    /// # Returns
    ///
    /// * a SampleBuffer with `rx` all ones.
    ///
    pub fn from_gdf(data: GdfData) -> Self {
        let n = data.samples.len();
        SampleBuffer {
            samples: data.samples,
            tx: data.tx,
            rx: vec![1; n],
        }
    }

    /// Read a concatenation of gdf file slices straight into a buffer.
    ///
    /// # Arguments
    ///
    /// * `slices` - the `(path, first_sample, last_sample)` triples to read.
    ///
    /// * `endianness` - byte order of the 16-bit integers in the files.
    ///
    ///
    /// # Returns
    ///
    /// * A Result containing the populated buffer if Ok.
    ///
    pub fn read_gdf(
        slices: &[GdfFileSlice],
        endianness: Endianness,
    ) -> Result<Self, LpiError> {
        Ok(SampleBuffer::from_gdf(read_gdf_data(slices, endianness)?))
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Shrink all three streams to `len` samples.
    ///
    /// # Arguments
    ///
    /// * `len` - new length; longer than the current length is a no-op.
    ///
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
        self.tx.truncate(len);
        self.rx.truncate(len);
    }
}
