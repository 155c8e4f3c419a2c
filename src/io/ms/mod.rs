// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to interface with CASA measurement sets.
//!
//! More info: https://casa.nrao.edu/Memos/229.html#SECTION00060000000000000000

mod error;

pub use error::MsReadError;

use std::path::Path;

use log::{debug, trace};
use marlu::rubbl_casatables;
use ndarray::prelude::*;
use rubbl_casatables::{Table, TableOpenMode};

/// Open a measurement set table read only. If `table` is `None`, then open
/// the base table.
fn read_table(ms: &Path, table: Option<&str>) -> Result<Table, MsReadError> {
    let t = Table::open(
        format!("{}/{}", ms.display(), table.unwrap_or("")),
        TableOpenMode::Read,
    )?;
    Ok(t)
}

/// The raw per-visibility and per-channel metadata of one measurement set,
/// needed to predict its theoretical noise. No visibility data is read.
pub struct DatasetMeta {
    /// The names in the FIELD subtable, in row order (so a FIELD_ID indexes
    /// into this).
    pub field_names: Vec<String>,

    /// The FIELD_ID of every main-table row.
    pub field_ids: Vec<i32>,

    /// The first antenna of every main-table row.
    pub antenna1: Vec<i32>,

    /// The second antenna of every main-table row.
    pub antenna2: Vec<i32>,

    /// Flags with shape (row, channel, polarisation). Flagged data have
    /// `true` here.
    pub flags: Array3<bool>,

    /// Per-row integration time \[seconds\].
    pub intervals: Array1<f64>,

    /// Channel centre frequencies \[Hz\], from the SPECTRAL_WINDOW subtable.
    pub chan_freqs: Array1<f64>,

    /// Channel widths \[Hz\], from the SPECTRAL_WINDOW subtable.
    pub chan_widths: Array1<f64>,
}

impl DatasetMeta {
    /// Read the flag, interval, field and channelisation metadata out of a
    /// measurement set.
    pub fn read<P: AsRef<Path>>(ms: P) -> Result<DatasetMeta, MsReadError> {
        fn inner(ms: &Path) -> Result<DatasetMeta, MsReadError> {
            debug!("Using measurement set: {}", ms.display());
            if !ms.exists() {
                return Err(MsReadError::BadFile(ms.to_path_buf()));
            }

            let mut main_table = read_table(ms, None)?;
            let num_rows = main_table.n_rows() as usize;
            if num_rows == 0 {
                return Err(MsReadError::MainTableEmpty);
            }
            trace!("The main table has {num_rows} rows");

            let mut field_table = read_table(ms, Some("FIELD"))?;
            let field_names: Vec<String> = field_table.get_col_as_vec("NAME")?;
            if field_names.is_empty() {
                return Err(MsReadError::FieldTableEmpty);
            }

            let mut spectral_window_table = read_table(ms, Some("SPECTRAL_WINDOW"))?;
            let chan_freqs: Vec<f64> = spectral_window_table.get_cell_as_vec("CHAN_FREQ", 0)?;
            if chan_freqs.is_empty() {
                return Err(MsReadError::NoChannelFreqs);
            }
            let chan_widths: Vec<f64> = spectral_window_table.get_cell_as_vec("CHAN_WIDTH", 0)?;
            if chan_widths.is_empty() {
                return Err(MsReadError::NoChanWidths);
            }
            if chan_freqs.len() != chan_widths.len() {
                return Err(MsReadError::MismatchNumFreqsNumWidths {
                    num_freqs: chan_freqs.len(),
                    num_widths: chan_widths.len(),
                });
            }
            let num_chans = chan_freqs.len();
            trace!("There are {num_chans} channels");

            let field_ids: Vec<i32> = main_table.get_col_as_vec("FIELD_ID")?;
            let antenna1: Vec<i32> = main_table.get_col_as_vec("ANTENNA1")?;
            let antenna2: Vec<i32> = main_table.get_col_as_vec("ANTENNA2")?;
            let intervals: Vec<f64> = main_table.get_col_as_vec("INTERVAL")?;

            // The FLAG column stores one (channel, polarisation) array per
            // row. Probe the first row for the polarisation count, then fill
            // a dense array.
            let mut num_pols = 0;
            main_table.for_each_row_in_range(0..1, |row| {
                let row_flags: Array2<bool> = row.get_cell("FLAG")?;
                num_pols = row_flags.len_of(Axis(1));
                Ok(())
            })?;

            let mut flags = Array3::from_elem((num_rows, num_chans, num_pols), false);
            let mut bad_row: Option<u64> = None;
            let mut i_row = 0;
            main_table.for_each_row(|row| {
                let row_flags: Array2<bool> = row.get_cell("FLAG")?;
                if row_flags.dim() == (num_chans, num_pols) {
                    flags.slice_mut(s![i_row, .., ..]).assign(&row_flags);
                } else if bad_row.is_none() {
                    bad_row = Some(i_row as u64);
                }
                i_row += 1;
                Ok(())
            })?;
            if let Some(row_index) = bad_row {
                return Err(MsReadError::BadArraySize {
                    array_type: "FLAG",
                    row_index,
                    expected_len: num_chans,
                });
            }

            Ok(DatasetMeta {
                field_names,
                field_ids,
                antenna1,
                antenna2,
                flags,
                intervals: Array1::from(intervals),
                chan_freqs: Array1::from(chan_freqs),
                chan_widths: Array1::from(chan_widths),
            })
        }
        inner(ms.as_ref())
    }
}
