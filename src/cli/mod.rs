// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code.
//!
//! Only 3 things should be public in this module: `VisRms`, `VisRms::run`,
//! and `VisRmsError`.

mod error;

pub use error::VisRmsError;

use std::path::{Path, PathBuf};

use clap::{AppSettings, Parser};
use log::info;
use vec1::Vec1;

use crate::{
    constants::{DEFAULT_DIAMETER_M, DEFAULT_EFFICIENCY, DEFAULT_TSYS_K},
    io::ms::DatasetMeta,
    messages,
    noise::{estimate_dataset, DatasetNoise, NoiseAccumulator},
    params::InstrumentParams,
    plotting,
};

/// The file written by `--plot`, in the working directory.
const PLOT_FILE_NAME: &str = "rms.png";

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Predict the theoretical thermal-noise rms of a radio-interferometric observation from the metadata of its measurement set(s), with and without accounting for flags."
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(infer_long_args = true)]
pub struct VisRms {
    /// Paths to the input measurement sets. When more than one is given,
    /// all must share an identical channelisation; their noise estimates
    /// are combined as independent measurements.
    #[clap(name = "MS_PATHS", parse(from_os_str), required = true)]
    ms_paths: Vec<PathBuf>,

    /// The system temperature [K], assumed frequency independent.
    #[clap(long, default_value_t = DEFAULT_TSYS_K)]
    tsys: f64,

    /// The aperture efficiency of a single antenna (0 < eff <= 1).
    #[clap(long, default_value_t = DEFAULT_EFFICIENCY)]
    eff: f64,

    /// The diameter of a single antenna [m].
    #[clap(long, default_value_t = DEFAULT_DIAMETER_M)]
    diam: f64,

    /// Only process the field with this name. The default is to process all
    /// available fields.
    #[clap(short, long)]
    field: Option<String>,

    /// Write a plot of the predicted noise curves to rms.png in the working
    /// directory.
    #[clap(long)]
    plot: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

impl VisRms {
    pub fn run(self) -> Result<(), VisRmsError> {
        setup_logging(self.verbosity).expect("Failed to initialise logging.");
        info!("vis-rms {}", env!("CARGO_PKG_VERSION"));

        // Everything user-supplied is validated before any dataset is
        // opened.
        let params = InstrumentParams::new(self.tsys, self.eff, self.diam)?;
        messages::AssumptionDetails { params: &params }.print();

        let ms_paths = Vec1::try_from_vec(self.ms_paths)
            .expect("clap guarantees at least one input path");
        let first_path = ms_paths.first();

        let first = process_dataset(first_path, &params, self.field.as_deref())?;
        let mut accumulator = NoiseAccumulator::new(first_path, first);
        for path in ms_paths.iter().skip(1) {
            let dataset = process_dataset(path, &params, self.field.as_deref())?;
            accumulator.add_dataset(path, dataset)?;
        }

        messages::ConcatenationDetails {
            num_datasets: accumulator.num_datasets(),
            flag_dim: accumulator.flag_dim(),
            total_integration_s: accumulator.total_integration_s(),
        }
        .print();

        let aggregate = accumulator.finalise(&params);
        messages::ResultDetails {
            aggregate: &aggregate,
        }
        .print();

        if self.plot {
            plotting::plot_noise(&aggregate, Path::new(PLOT_FILE_NAME))?;
            info!("{PLOT_FILE_NAME} saved in the working directory");
        }

        Ok(())
    }
}

/// Read one measurement set's metadata, estimate its noise and report the
/// per-dataset diagnostics.
fn process_dataset(
    path: &Path,
    params: &InstrumentParams,
    select_field: Option<&str>,
) -> Result<DatasetNoise, VisRmsError> {
    messages::WorkingOn { path }.print();
    let meta = DatasetMeta::read(path)?;
    let dataset = estimate_dataset(&meta, params, select_field)?;
    messages::DatasetDetails {
        dataset: &dataset,
        field_names: &meta.field_names,
        select_field,
    }
    .print();
    Ok(dataset)
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty
/// (e.g. a terminal); piped output will be formatted sensibly. Source code
/// lines are displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();

    Ok(())
}
