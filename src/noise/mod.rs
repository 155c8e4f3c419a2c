// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The thermal-noise estimation core.
//!
//! Everything in here is a pure computation on `ndarray` arrays; reading
//! measurement sets and reporting results live elsewhere. A
//! [`DatasetNoise`] is estimated per dataset, then a [`NoiseAccumulator`]
//! combines any number of them into a joint prediction, with and without
//! accounting for flags.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use ndarray::prelude::*;
use thiserror::Error;

use crate::{
    constants::{BOLTZMANN_JY_M2_PER_K, SQRT_2},
    io::ms::DatasetMeta,
    params::InstrumentParams,
};

#[derive(Error, Debug)]
pub enum NoiseError {
    #[error(
        "Cannot find the field you want to process, {field}\nAvailable fields are: {}",
        available.iter().join(", ")
    )]
    FieldNotFound {
        field: String,
        available: Vec<String>,
    },

    #[error("{other} has a different channelisation than {first} (first difference at channel {index}); cannot combine them to estimate their joint theoretical noise")]
    ChannelizationMismatch {
        first: PathBuf,
        other: PathBuf,
        index: usize,
    },

    #[error("Cannot concatenate the arrays of {other} onto those of {first}: {err}")]
    Concatenate {
        first: PathBuf,
        other: PathBuf,
        err: ndarray::ShapeError,
    },
}

/// Diagnostics gathered while estimating a single dataset. Only for
/// reporting; none of this feeds back into the numerics.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    /// The number of unique antenna indices seen in either antenna column.
    pub num_antennas: usize,

    /// `n (n - 1) / 2` for `n` antennas.
    pub num_baselines: usize,

    pub num_polarisations: usize,

    /// Were any auto-correlation rows present (and therefore dropped)?
    pub autos_present: bool,

    /// The FIELD-table row matching the requested field name, if one was
    /// requested.
    pub selected_field_id: Option<usize>,

    /// Min and max channel centre frequency \[Hz\].
    pub freq_range_hz: (f64, f64),

    /// The common channel width \[Hz\] if all channels share one, otherwise
    /// the (min, max) spread.
    pub chan_width_hz: ChannelWidths,

    /// Total integration on the selected field(s), per baseline \[hours\].
    pub total_integration_h: f64,

    /// Min and max of the flag-ignoring rms \[Jy\].
    pub rms_range_jy: (f64, f64),
}

#[derive(Debug, Clone, Copy)]
pub enum ChannelWidths {
    Uniform(f64),
    Varying { min: f64, max: f64 },
}

/// The result of estimating one dataset: the selected raw arrays (still
/// needed for aggregation) and the per-channel rms ignoring flags.
#[derive(Debug)]
pub struct DatasetNoise {
    /// Flags of the selected rows, shape (row, channel, polarisation).
    pub flags: Array3<bool>,

    /// Integration times of the selected rows \[seconds\].
    pub intervals: Array1<f64>,

    /// Channel centre frequencies \[Hz\].
    pub chan_freqs: Array1<f64>,

    /// Channel widths \[Hz\].
    pub chan_widths: Array1<f64>,

    /// Per-channel rms ignoring flags \[Jy\].
    pub rms: Array1<f64>,

    pub stats: DatasetStats,
}

/// The numerator common to all of the rms expressions: `√2 k Tsys / eff / A`
/// \[Jy\]. Dividing by `sqrt(bandwidth × integration)` yields an rms.
fn rms_coefficient(params: &InstrumentParams) -> f64 {
    SQRT_2 * BOLTZMANN_JY_M2_PER_K * params.tsys_k
        / params.efficiency
        / params.collecting_area_m2
}

/// Estimate the per-channel theoretical rms of one dataset, ignoring flags.
///
/// If `select_field` is given, only rows of that field contribute; an
/// unknown name is a fatal error. Auto-correlation rows are always
/// excluded.
pub fn estimate_dataset(
    meta: &DatasetMeta,
    params: &InstrumentParams,
    select_field: Option<&str>,
) -> Result<DatasetNoise, NoiseError> {
    let selected_field_id = match select_field {
        Some(name) => match meta.field_names.iter().position(|n| n == name) {
            Some(i) => Some(i),
            None => {
                return Err(NoiseError::FieldNotFound {
                    field: name.to_string(),
                    available: meta.field_names.clone(),
                })
            }
        },
        None => None,
    };

    // Antenna statistics come from the full antenna columns, not just the
    // selected rows.
    let num_antennas = meta
        .antenna1
        .iter()
        .chain(meta.antenna2.iter())
        .collect::<HashSet<_>>()
        .len();
    let num_baselines = num_antennas * num_antennas.saturating_sub(1) / 2;
    let autos_present = meta
        .antenna1
        .iter()
        .zip(meta.antenna2.iter())
        .any(|(a1, a2)| a1 == a2);

    let mut selected_rows = Vec::with_capacity(meta.field_ids.len());
    for (i_row, ((&field_id, &a1), &a2)) in meta
        .field_ids
        .iter()
        .zip(meta.antenna1.iter())
        .zip(meta.antenna2.iter())
        .enumerate()
    {
        let field_ok = selected_field_id.map_or(true, |id| field_id == id as i32);
        if field_ok && a1 != a2 {
            selected_rows.push(i_row);
        }
    }

    let flags = meta.flags.select(Axis(0), &selected_rows);
    let intervals = meta.intervals.select(Axis(0), &selected_rows);

    let num_polarisations = flags.len_of(Axis(2));
    let total_integration_s = intervals.sum();
    let coeff = rms_coefficient(params);
    let rms = meta
        .chan_widths
        .mapv(|width| coeff / (width * total_integration_s * num_polarisations as f64).sqrt());

    let stats = DatasetStats {
        num_antennas,
        num_baselines,
        num_polarisations,
        autos_present,
        selected_field_id,
        freq_range_hz: finite_range(meta.chan_freqs.iter().copied())
            .unwrap_or((f64::NAN, f64::NAN)),
        chan_width_hz: {
            let first = meta.chan_widths[0];
            if meta.chan_widths.iter().all(|&w| w == first) {
                ChannelWidths::Uniform(first)
            } else {
                let (min, max) = finite_range(meta.chan_widths.iter().copied())
                    .unwrap_or((f64::NAN, f64::NAN));
                ChannelWidths::Varying { min, max }
            }
        },
        total_integration_h: if num_baselines > 0 {
            total_integration_s / num_baselines as f64 / 3600.0
        } else {
            f64::NAN
        },
        rms_range_jy: finite_range(rms.iter().copied()).unwrap_or((f64::NAN, f64::NAN)),
    };

    Ok(DatasetNoise {
        flags,
        intervals,
        chan_freqs: meta.chan_freqs.clone(),
        chan_widths: meta.chan_widths.clone(),
        rms,
        stats,
    })
}

/// Accumulates per-dataset results into one joint estimate. Seeded from the
/// first dataset; each later dataset is checked for an identical
/// channelisation *before* any state is mutated, so a failed
/// [`NoiseAccumulator::add_dataset`] leaves the accumulator untouched.
pub struct NoiseAccumulator {
    first_path: PathBuf,
    chan_freqs: Array1<f64>,
    chan_widths: Array1<f64>,
    flags: Array3<bool>,
    intervals: Array1<f64>,
    per_dataset_rms: Vec<Array1<f64>>,
}

impl NoiseAccumulator {
    pub fn new<P: AsRef<Path>>(path: P, first: DatasetNoise) -> NoiseAccumulator {
        NoiseAccumulator {
            first_path: path.as_ref().to_path_buf(),
            chan_freqs: first.chan_freqs,
            chan_widths: first.chan_widths,
            flags: first.flags,
            intervals: first.intervals,
            per_dataset_rms: vec![first.rms],
        }
    }

    /// Validate a later dataset against the first and append its arrays
    /// along the row axis.
    pub fn add_dataset<P: AsRef<Path>>(
        &mut self,
        path: P,
        dataset: DatasetNoise,
    ) -> Result<(), NoiseError> {
        let path = path.as_ref();

        // Exact equality; combining differently-channelised data is never
        // meaningful, so nothing is auto-reconciled here.
        let freq_mismatch = self
            .chan_freqs
            .iter()
            .zip_longest(dataset.chan_freqs.iter())
            .position(|pair| match pair {
                itertools::EitherOrBoth::Both(a, b) => a != b,
                _ => true,
            });
        let width_mismatch = self
            .chan_widths
            .iter()
            .zip_longest(dataset.chan_widths.iter())
            .position(|pair| match pair {
                itertools::EitherOrBoth::Both(a, b) => a != b,
                _ => true,
            });
        if let Some(index) = [freq_mismatch, width_mismatch].into_iter().flatten().min() {
            return Err(NoiseError::ChannelizationMismatch {
                first: self.first_path.clone(),
                other: path.to_path_buf(),
                index,
            });
        }

        // Build both concatenations before assigning either, so that a
        // shape failure cannot leave the accumulator half-updated.
        let flags = ndarray::concatenate(Axis(0), &[self.flags.view(), dataset.flags.view()])
            .map_err(|err| NoiseError::Concatenate {
                first: self.first_path.clone(),
                other: path.to_path_buf(),
                err,
            })?;
        let intervals =
            ndarray::concatenate(Axis(0), &[self.intervals.view(), dataset.intervals.view()])
                .map_err(|err| NoiseError::Concatenate {
                    first: self.first_path.clone(),
                    other: path.to_path_buf(),
                    err,
                })?;

        self.flags = flags;
        self.intervals = intervals;
        self.per_dataset_rms.push(dataset.rms);
        Ok(())
    }

    /// The shape of the concatenated flag array: (rows, channels,
    /// polarisations).
    pub fn flag_dim(&self) -> (usize, usize, usize) {
        self.flags.dim()
    }

    pub fn num_datasets(&self) -> usize {
        self.per_dataset_rms.len()
    }

    /// Total concatenated integration time \[seconds\].
    pub fn total_integration_s(&self) -> f64 {
        self.intervals.sum()
    }

    /// Produce the joint estimates from everything accumulated so far.
    pub fn finalise(self, params: &InstrumentParams) -> AggregateNoise {
        let num_chans = self.chan_freqs.len();
        let num_pols = self.flags.len_of(Axis(2));

        // Independent measurements combine by summing inverse variances.
        let mut rms_all = Array1::zeros(num_chans);
        for (i_chan, rms) in rms_all.iter_mut().enumerate() {
            let inv_var_sum: f64 = self
                .per_dataset_rms
                .iter()
                .map(|per_dataset| 1.0 / per_dataset[i_chan].powi(2))
                .sum();
            *rms = 1.0 / inv_var_sum.sqrt();
        }

        // Per channel, total up the unflagged integration over all rows and
        // polarisations, then apply the same rms expression. A fully
        // flagged channel has no defined rms; that is an explicit NaN, not
        // a division by zero.
        let coeff = rms_coefficient(params);
        let mut rms_unflagged = Array1::zeros(num_chans);
        for (i_chan, rms) in rms_unflagged.iter_mut().enumerate() {
            let mut unflagged_integration_s = 0.0;
            for (i_row, &interval) in self.intervals.iter().enumerate() {
                for i_pol in 0..num_pols {
                    if !self.flags[(i_row, i_chan, i_pol)] {
                        unflagged_integration_s += interval;
                    }
                }
            }
            *rms = if unflagged_integration_s == 0.0 {
                f64::NAN
            } else {
                coeff / (self.chan_widths[i_chan] * unflagged_integration_s).sqrt()
            };
        }

        AggregateNoise {
            chan_freqs: self.chan_freqs,
            rms_all,
            rms_unflagged,
        }
    }
}

/// The final joint prediction over all input datasets.
pub struct AggregateNoise {
    /// Channel centre frequencies \[Hz\].
    pub chan_freqs: Array1<f64>,

    /// Per-channel rms ignoring flags \[Jy\].
    pub rms_all: Array1<f64>,

    /// Per-channel rms counting only unflagged samples \[Jy\]. Fully
    /// flagged channels are NaN.
    pub rms_unflagged: Array1<f64>,
}

impl AggregateNoise {
    /// (min, max) of the flag-ignoring rms, skipping non-finite entries.
    pub fn rms_all_range(&self) -> Option<(f64, f64)> {
        finite_range(self.rms_all.iter().copied())
    }

    /// (min, max) of the flag-corrected rms, skipping non-finite entries.
    pub fn rms_unflagged_range(&self) -> Option<(f64, f64)> {
        finite_range(self.rms_unflagged.iter().copied())
    }
}

/// (min, max) over the finite values of an iterator, or `None` if there are
/// no finite values.
pub(crate) fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}
