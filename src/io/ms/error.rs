// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with interacting with CASA measurement sets.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MsReadError {
    #[error("Supplied file path {0} does not exist or is not readable!")]
    BadFile(PathBuf),

    #[error("The main table of the measurement set contains no rows!")]
    MainTableEmpty,

    #[error("The FIELD table of the measurement set contains no names!")]
    FieldTableEmpty,

    #[error("The SPECTRAL_WINDOW table contained no channel frequencies")]
    NoChannelFreqs,

    #[error("The SPECTRAL_WINDOW table contained no channel widths")]
    NoChanWidths,

    #[error("The SPECTRAL_WINDOW table has {num_freqs} channel frequencies but {num_widths} channel widths; there must be an equal number of both")]
    MismatchNumFreqsNumWidths { num_freqs: usize, num_widths: usize },

    #[error("MS {array_type} from row {row_index} did not have the expected {expected_len} elements on the channel axis!")]
    BadArraySize {
        array_type: &'static str,
        row_index: u64,
        expected_len: usize,
    },

    #[error("Error when trying to interface with measurement set: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
