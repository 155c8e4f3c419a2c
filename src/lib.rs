// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Predict the theoretical thermal-noise rms of radio-interferometric
observations from measurement-set metadata.
 */

mod cli;
pub mod constants;
pub mod io;
mod messages;
pub mod noise;
pub mod params;
mod plotting;

// Re-exports.
pub use cli::{VisRms, VisRmsError};
