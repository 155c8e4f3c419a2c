// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all vis-rms-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use crate::{
    io::ms::MsReadError, noise::NoiseError, params::ParamsError, plotting::PlotError,
};

/// The *only* publicly visible error from vis-rms.
#[derive(Error, Debug)]
pub enum VisRmsError {
    /// An error validating the instrument parameters.
    #[error("{0}")]
    Params(String),

    /// An error reading a measurement set.
    #[error("{0}")]
    MsRead(String),

    /// An error from the noise estimation itself.
    #[error("{0}")]
    Noise(String),

    /// An error producing the noise-curve plot.
    #[error("{0}")]
    Plot(String),

    /// A generic IO error.
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl From<ParamsError> for VisRmsError {
    fn from(e: ParamsError) -> Self {
        Self::Params(e.to_string())
    }
}

impl From<MsReadError> for VisRmsError {
    fn from(e: MsReadError) -> Self {
        Self::MsRead(e.to_string())
    }
}

impl From<NoiseError> for VisRmsError {
    fn from(e: NoiseError) -> Self {
        Self::Noise(e.to_string())
    }
}

impl From<PlotError> for VisRmsError {
    fn from(e: PlotError) -> Self {
        Self::Plot(e.to_string())
    }
}
