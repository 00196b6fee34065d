// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Read a slice of a gdf file, run the full single-lag pipeline and print
/// the accumulated Fisher diagonal, to verify that `lpilib` is
/// functioning correctly against real data.
use anyhow::*;
use clap::Parser;

use lpilib::*;

#[derive(Parser, Debug)]
#[clap(name = "lpi-gdf-dump", author)]
struct Opt {
    /// Use big endian byte order when reading the gdf files.
    #[clap(short, long)]
    bigendian: bool,

    /// Temporal lag in samples.
    #[clap(short, long, default_value = "1")]
    lag: usize,

    /// Range gate limits, sorted, in samples.
    #[clap(short, long, value_delimiter = ',', default_value = "10,20,30,40")]
    rlims: Vec<i32>,

    /// Number of samples to read from the start of each file.
    #[clap(short, long, default_value = "100000")]
    nsamples: u64,

    /// Paths to the gdf files.
    #[clap(name = "GDF FILE")]
    files: Vec<std::path::PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::try_init().unwrap_or(());
    let opts = Opt::parse();

    let endianness = if opts.bigendian {
        Endianness::Big
    } else {
        Endianness::Little
    };

    let slices: Vec<GdfFileSlice> = opts
        .files
        .iter()
        .map(|f| GdfFileSlice::new(f, 0, opts.nsamples - 1))
        .collect();

    let data = read_gdf_data(&slices, endianness)?;
    println!("read {} samples ({})", data.len(), endianness);

    let mut buffer = SampleBuffer::from_gdf(data);

    // Pass the data through unresampled; real drivers decimate here
    let params = PrepareParams {
        frequency: 0.0,
        shifts: [0, 0],
        resample: ResampleParams {
            nup: 1,
            nfilter: 1,
            nfirst: 0,
            nfirstfrac: 0,
            marker_mode: MarkerMode::AllSet,
        },
    };
    let mut tx = buffer.tx.clone();
    prepare_data(&mut buffer.samples, &mut tx, &params);
    buffer.truncate(tx.len());
    buffer.tx = tx;

    let power = average_power(&buffer.samples, &buffer.tx, &buffer.rx, 1000, 10);
    println!("power estimate quality: {:.3}", power.quality);

    let prod = lagged_products(
        &buffer.samples,
        &buffer.samples,
        &buffer.rx,
        &buffer.rx,
        opts.lag,
    );
    let amb = range_ambiguity(
        &buffer.samples,
        &buffer.samples,
        &buffer.tx,
        &buffer.tx,
        opts.lag,
    );
    let var = lagged_products_real(&power.power, &power.power, opts.lag);

    let scan = TheoryRowScan {
        r_lims: opts.rlims,
        background: true,
        remote_rx: false,
    };
    let mut batch = TheoryRowBatch::new();
    let mut fisher = FisherAccumulator::new(scan.n_unknowns());

    let n_rows = theory_rows(&amb, &prod, &var, 0, buffer.len(), &scan, &mut batch)?;
    fisher.add_rows(&batch);

    println!("accumulated {} theory rows", n_rows);
    for (i, value) in fisher.y.iter().enumerate() {
        let d = fisher.q[misc::upper_triangle_index(i, i, scan.n_unknowns())];
        println!(
            "gate {:3}: Q {:14.6e}  y {:14.6e} {:+14.6e}i",
            i, d.re, value.re, value.im
        );
    }

    Ok(())
}
