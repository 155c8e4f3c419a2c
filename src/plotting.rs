// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to plot the predicted noise curves.
//!
//! Plotting is an optional feature, because the C dependencies needed for
//! font rendering cannot always be built. Without the "plotting" feature,
//! asking for a plot is an error.

use std::path::Path;

use thiserror::Error;

use crate::noise::AggregateNoise;

#[derive(Error, Debug)]
pub enum PlotError {
    #[cfg(not(feature = "plotting"))]
    #[error("vis-rms was not compiled with the \"plotting\" feature.\nYou need to compile vis-rms from source with this feature to plot noise curves.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error("Error from the plotters library: {0}")]
    Draw(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[cfg(not(feature = "plotting"))]
pub(crate) fn plot_noise(_: &AggregateNoise, _: &Path) -> Result<(), PlotError> {
    Err(PlotError::NoPlottingFeature)
}

/// Render the two noise curves (flag-ignoring and flag-corrected) against
/// frequency into a PNG. Channels with an undefined rms are simply left off
/// the plot.
#[cfg(feature = "plotting")]
pub(crate) fn plot_noise(aggregate: &AggregateNoise, output: &Path) -> Result<(), PlotError> {
    use plotters::prelude::*;

    // Jy -> mJy for the y axis, finite points only.
    let all_points: Vec<(f64, f64)> = aggregate
        .chan_freqs
        .iter()
        .zip(aggregate.rms_all.iter())
        .filter(|(_, rms)| rms.is_finite())
        .map(|(&freq, &rms)| (freq, rms * 1e3))
        .collect();
    let unflagged_points: Vec<(f64, f64)> = aggregate
        .chan_freqs
        .iter()
        .zip(aggregate.rms_unflagged.iter())
        .filter(|(_, rms)| rms.is_finite())
        .map(|(&freq, &rms)| (freq, rms * 1e3))
        .collect();

    let (mut x_min, mut x_max) = match crate::noise::finite_range(aggregate.chan_freqs.iter().copied())
    {
        Some(r) => r,
        None => (0.0, 1.0),
    };
    if x_min == x_max {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let y_max = all_points
        .iter()
        .chain(unflagged_points.iter())
        .map(|&(_, y)| y)
        .fold(0.0, f64::max)
        .max(f64::MIN_POSITIVE);

    let root = BitMapBackend::new(output, (1200, 900)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::Draw(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)
        .map_err(|e| PlotError::Draw(e.to_string()))?;
    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("rms (mJy)")
        .draw()
        .map_err(|e| PlotError::Draw(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(all_points, BLACK.stroke_width(1)))
        .map_err(|e| PlotError::Draw(e.to_string()))?
        .label("all data")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    chart
        .draw_series(LineSeries::new(unflagged_points, RED.stroke_width(1)))
        .map_err(|e| PlotError::Draw(e.to_string()))?
        .label("unflagged data")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Draw(e.to_string()))?;

    root.present().map_err(|e| PlotError::Draw(e.to_string()))?;
    Ok(())
}
