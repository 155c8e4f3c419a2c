// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

pub use std::f64::consts::{PI, SQRT_2};

/// The Boltzmann constant expressed in Jy m² / K. Dividing by an effective
/// collecting area in m² turns a temperature into a flux density.
pub const BOLTZMANN_JY_M2_PER_K: f64 = 1380.6;

/// The default system temperature \[K\].
pub const DEFAULT_TSYS_K: f64 = 22.0;

/// The default aperture efficiency of a single antenna.
pub const DEFAULT_EFFICIENCY: f64 = 1.0;

/// The default diameter of a single antenna \[m\].
pub const DEFAULT_DIAMETER_M: f64 = 13.5;
