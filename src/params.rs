// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument parameters, validated once before any data is touched.

use thiserror::Error;

use crate::constants::{BOLTZMANN_JY_M2_PER_K, PI};

/// Physical antenna parameters and the quantities derived from them. These
/// are fixed for a whole run; every dataset is estimated with the same
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentParams {
    /// The system temperature \[K\], assumed frequency independent.
    pub tsys_k: f64,

    /// The aperture efficiency of a single antenna (0 < eff <= 1).
    pub efficiency: f64,

    /// The diameter of a single antenna \[m\].
    pub diameter_m: f64,

    /// The collecting area of a single antenna \[m²\].
    pub collecting_area_m2: f64,

    /// The system equivalent flux density \[Jy\].
    pub sefd_jy: f64,
}

impl InstrumentParams {
    pub fn new(tsys_k: f64, efficiency: f64, diameter_m: f64) -> Result<InstrumentParams, ParamsError> {
        if !tsys_k.is_finite() || tsys_k <= 0.0 {
            return Err(ParamsError::Tsys(tsys_k));
        }
        if !efficiency.is_finite() || efficiency <= 0.0 || efficiency > 1.0 {
            return Err(ParamsError::Efficiency(efficiency));
        }
        if !diameter_m.is_finite() || diameter_m <= 0.0 {
            return Err(ParamsError::Diameter(diameter_m));
        }

        let collecting_area_m2 = PI * (diameter_m / 2.0).powi(2);
        let sefd_jy = 2.0 * BOLTZMANN_JY_M2_PER_K * tsys_k / efficiency / collecting_area_m2;
        Ok(InstrumentParams {
            tsys_k,
            efficiency,
            diameter_m,
            collecting_area_m2,
            sefd_jy,
        })
    }
}

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("The system temperature must be a positive number, got {0}")]
    Tsys(f64),

    #[error("The antenna efficiency must be in (0, 1], got {0}")]
    Efficiency(f64),

    #[error("The antenna diameter must be a positive number of metres, got {0}")]
    Diameter(f64),
}
