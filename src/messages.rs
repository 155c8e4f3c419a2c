// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Messages to report to the user.
//!
//! Keeping all of the user-facing reporting here keeps the noise
//! computations free of printing, and the output in a predictable order.

use std::path::Path;

use itertools::Itertools;
use log::info;

use crate::{
    noise::{AggregateNoise, ChannelWidths, DatasetNoise},
    params::InstrumentParams,
};

#[must_use = "This struct must be consumed with its print() method"]
pub(super) struct AssumptionDetails<'a> {
    pub(super) params: &'a InstrumentParams,
}

impl AssumptionDetails<'_> {
    pub(super) fn print(self) {
        info!("--- Assumptions ---");
        info!(
            "  Tsys/efficiency      = {:.1} K (frequency independent)",
            self.params.tsys_k / self.params.efficiency
        );
        info!("  Dish diameter        = {:.1} m", self.params.diameter_m);
        info!("    and therefore SEFD = {:.1} Jy", self.params.sefd_jy);
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(super) struct DatasetDetails<'a> {
    pub(super) dataset: &'a DatasetNoise,
    pub(super) field_names: &'a [String],
    pub(super) select_field: Option<&'a str>,
}

impl DatasetDetails<'_> {
    pub(super) fn print(self) {
        let stats = &self.dataset.stats;
        match (self.select_field, stats.selected_field_id) {
            (Some(name), Some(id)) => {
                info!("Selected field {name} (field ID = {id})");
            }
            _ => {
                info!(
                    "Will process all available fields: {}",
                    self.field_names.iter().join(", ")
                );
            }
        }
        if stats.autos_present {
            info!("Selected cross-correlations only");
        } else {
            info!("Found cross-correlations only");
        }
        info!("Number of antennas  = {}", stats.num_antennas);
        info!("Number of baselines = {}", stats.num_baselines);
        info!(
            "Frequency coverage  = {:.5e} Hz - {:.5e} Hz",
            stats.freq_range_hz.0, stats.freq_range_hz.1
        );
        match stats.chan_width_hz {
            ChannelWidths::Uniform(w) => info!("Channel width       = {w:.5e} Hz"),
            ChannelWidths::Varying { min, max } => {
                info!("Channel widths range from {min:.5e} Hz to {max:.5e} Hz")
            }
        }
        let (num_rows, num_chans, num_pols) = self.dataset.flags.dim();
        info!("The flag array has shape (rows, channels, polarisations) = ({num_rows}, {num_chans}, {num_pols})");
        info!(
            "Total integration on selected field(s) = {:.2} h ({} polarisations)",
            stats.total_integration_h, stats.num_polarisations
        );
        info!(
            "Theoretical rms ignoring flags is in the range ({:.3e} - {:.3e}) Jy",
            stats.rms_range_jy.0, stats.rms_range_jy.1
        );
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(super) struct ConcatenationDetails {
    pub(super) num_datasets: usize,
    /// (rows, channels, polarisations)
    pub(super) flag_dim: (usize, usize, usize),
    pub(super) total_integration_s: f64,
}

impl ConcatenationDetails {
    pub(super) fn print(self) {
        info!("");
        info!("--- All input datasets concatenated ---");
        let (num_rows, num_chans, num_pols) = self.flag_dim;
        info!("{} datasets ingested", self.num_datasets);
        info!("The concatenated flag array has shape (rows, channels, polarisations) = ({num_rows}, {num_chans}, {num_pols})");
        info!(
            "Concatenated integration time = {:.2} s",
            self.total_integration_s
        );
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(super) struct ResultDetails<'a> {
    pub(super) aggregate: &'a AggregateNoise,
}

impl ResultDetails<'_> {
    pub(super) fn print(self) {
        info!("");
        info!("--- Result ---");
        match self.aggregate.rms_all_range() {
            Some((min, max)) => info!(
                "Theoretical rms ignoring flags is in the range ({min:.3e} - {max:.3e}) Jy"
            ),
            None => info!("Theoretical rms ignoring flags is undefined for every channel"),
        }
        match self.aggregate.rms_unflagged_range() {
            Some((min, max)) => info!(
                "Theoretical rms applying flags is in the range ({min:.3e} - {max:.3e}) Jy"
            ),
            None => info!("Theoretical rms applying flags is undefined for every channel (all data flagged)"),
        }
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(super) struct WorkingOn<'a> {
    pub(super) path: &'a Path,
}

impl WorkingOn<'_> {
    pub(super) fn print(self) {
        info!("");
        info!("--- Working on {} ---", self.path.display());
    }
}
