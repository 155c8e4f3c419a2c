// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

use vis_rms::{VisRms, VisRmsError};

fn main() {
    // On error, print it to stderr and die with a non-zero exit code.
    if let Err(e) = try_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), VisRmsError> {
    VisRms::parse().run()
}
