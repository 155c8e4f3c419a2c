// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;
use crate::constants::{BOLTZMANN_JY_M2_PER_K, PI, SQRT_2};

fn default_params() -> InstrumentParams {
    InstrumentParams::new(22.0, 1.0, 13.5).unwrap()
}

/// Two antennas, one field, cross-correlations only; the caller controls
/// the intervals, flags and channelisation.
fn two_antenna_meta(
    intervals: &[f64],
    flags: Array3<bool>,
    chan_freqs: &[f64],
    chan_widths: &[f64],
) -> DatasetMeta {
    let num_rows = intervals.len();
    assert_eq!(flags.len_of(Axis(0)), num_rows);
    DatasetMeta {
        field_names: vec!["deep_field".to_string()],
        field_ids: vec![0; num_rows],
        antenna1: vec![0; num_rows],
        antenna2: vec![1; num_rows],
        flags,
        intervals: Array1::from(intervals.to_vec()),
        chan_freqs: Array1::from(chan_freqs.to_vec()),
        chan_widths: Array1::from(chan_widths.to_vec()),
    }
}

#[test]
fn test_instrument_params_derived_quantities() {
    let params = default_params();
    assert_abs_diff_eq!(params.collecting_area_m2, PI * 6.75 * 6.75, epsilon = 1e-9);
    assert_abs_diff_eq!(params.collecting_area_m2, 143.139, epsilon = 1e-3);
    assert_abs_diff_eq!(
        params.sefd_jy,
        2.0 * BOLTZMANN_JY_M2_PER_K * 22.0 / (PI * 6.75 * 6.75),
        epsilon = 1e-9
    );
    // The canonical number for the default parameters.
    assert_abs_diff_eq!(params.sefd_jy, 424.4, epsilon = 0.1);
}

#[test]
fn test_bad_instrument_params_are_rejected() {
    assert!(InstrumentParams::new(0.0, 1.0, 13.5).is_err());
    assert!(InstrumentParams::new(f64::NAN, 1.0, 13.5).is_err());
    assert!(InstrumentParams::new(22.0, 0.0, 13.5).is_err());
    assert!(InstrumentParams::new(22.0, 1.5, 13.5).is_err());
    assert!(InstrumentParams::new(22.0, 1.0, -13.5).is_err());
    assert!(InstrumentParams::new(22.0, 1.0, 13.5).is_ok());
}

#[test]
fn test_single_channel_closed_form() {
    // 1 channel of width 1 MHz, 3600 s of integration, 1 polarisation.
    let params = default_params();
    let flags = Array3::from_elem((1, 1, 1), false);
    let meta = two_antenna_meta(&[3600.0], flags, &[1.4e9], &[1e6]);

    let dataset = estimate_dataset(&meta, &params, None).unwrap();
    let expected = SQRT_2 * BOLTZMANN_JY_M2_PER_K * 22.0
        / (PI * 6.75 * 6.75)
        / (1e6_f64 * 3600.0).sqrt();
    assert_eq!(dataset.rms.len(), 1);
    assert_abs_diff_eq!(dataset.rms[0], expected, epsilon = 1e-12);
}

#[test]
fn test_single_dataset_identity() {
    // With N=1 the combination must reproduce the single-dataset estimate,
    // and with nothing flagged the flag-corrected curve must match too.
    let params = default_params();
    let flags = Array3::from_elem((3, 2, 2), false);
    let meta = two_antenna_meta(&[10.0, 10.0, 10.0], flags, &[1.0e9, 1.1e9], &[1e6, 1e6]);

    let dataset = estimate_dataset(&meta, &params, None).unwrap();
    let per_dataset_rms = dataset.rms.clone();
    let accumulator = NoiseAccumulator::new("a.ms", dataset);
    let aggregate = accumulator.finalise(&params);

    for (&combined, &single) in aggregate.rms_all.iter().zip(per_dataset_rms.iter()) {
        assert_abs_diff_eq!(combined, single, epsilon = 1e-12);
    }
    for (&corrected, &single) in aggregate.rms_unflagged.iter().zip(per_dataset_rms.iter()) {
        assert_abs_diff_eq!(corrected, single, epsilon = 1e-12);
    }
}

#[test]
fn test_combination_is_order_invariant() {
    let params = default_params();
    let chan_freqs = [1.0e9, 1.1e9, 1.2e9];
    let chan_widths = [1e6, 1e6, 2e6];

    let make = |intervals: &[f64], flag_rows: &[usize]| {
        let mut flags = Array3::from_elem((intervals.len(), 3, 2), false);
        for &i_row in flag_rows {
            flags.slice_mut(s![i_row, 0, ..]).fill(true);
        }
        two_antenna_meta(intervals, flags, &chan_freqs, &chan_widths)
    };

    let combine = |metas: &[&DatasetMeta]| {
        let mut datasets = metas
            .iter()
            .map(|&meta| estimate_dataset(meta, &params, None).unwrap());
        let mut accumulator = NoiseAccumulator::new("0.ms", datasets.next().unwrap());
        for (i, dataset) in datasets.enumerate() {
            accumulator
                .add_dataset(format!("{}.ms", i + 1), dataset)
                .unwrap();
        }
        accumulator.finalise(&params)
    };

    let a = make(&[10.0, 20.0], &[0]);
    let b = make(&[30.0], &[]);
    let c = make(&[5.0, 5.0, 5.0], &[1, 2]);

    let forwards = combine(&[&a, &b, &c]);
    let backwards = combine(&[&c, &b, &a]);

    for (&x, &y) in forwards.rms_all.iter().zip(backwards.rms_all.iter()) {
        assert_abs_diff_eq!(x, y, epsilon = 1e-12);
    }
    for (&x, &y) in forwards
        .rms_unflagged
        .iter()
        .zip(backwards.rms_unflagged.iter())
    {
        assert_abs_diff_eq!(x, y, epsilon = 1e-12);
    }
}

#[test]
fn test_concatenation_preserves_total_integration() {
    let params = default_params();
    let flags_a = Array3::from_elem((2, 2, 1), false);
    let flags_b = Array3::from_elem((3, 2, 1), false);
    let a = two_antenna_meta(&[10.0, 20.0], flags_a, &[1.0e9, 1.1e9], &[1e6, 1e6]);
    let b = two_antenna_meta(&[5.0, 5.0, 5.0], flags_b, &[1.0e9, 1.1e9], &[1e6, 1e6]);

    let mut accumulator = NoiseAccumulator::new(
        "a.ms",
        estimate_dataset(&a, &params, None).unwrap(),
    );
    accumulator
        .add_dataset("b.ms", estimate_dataset(&b, &params, None).unwrap())
        .unwrap();

    assert_abs_diff_eq!(
        accumulator.total_integration_s(),
        10.0 + 20.0 + 5.0 + 5.0 + 5.0,
        epsilon = 1e-9
    );
    assert_eq!(accumulator.flag_dim(), (5, 2, 1));
    assert_eq!(accumulator.num_datasets(), 2);
}

#[test]
fn test_fully_flagged_channel_is_nan() {
    let params = default_params();
    // Channel 0 completely flagged in both datasets, channel 1 untouched.
    let mut flags_a = Array3::from_elem((2, 2, 2), false);
    flags_a.slice_mut(s![.., 0, ..]).fill(true);
    let mut flags_b = Array3::from_elem((1, 2, 2), false);
    flags_b.slice_mut(s![.., 0, ..]).fill(true);
    let a = two_antenna_meta(&[10.0, 10.0], flags_a, &[1.0e9, 1.1e9], &[1e6, 1e6]);
    let b = two_antenna_meta(&[30.0], flags_b, &[1.0e9, 1.1e9], &[1e6, 1e6]);

    let mut accumulator = NoiseAccumulator::new(
        "a.ms",
        estimate_dataset(&a, &params, None).unwrap(),
    );
    accumulator
        .add_dataset("b.ms", estimate_dataset(&b, &params, None).unwrap())
        .unwrap();
    let aggregate = accumulator.finalise(&params);

    assert!(aggregate.rms_unflagged[0].is_nan());
    assert!(aggregate.rms_unflagged[1].is_finite());
    // The flag-ignoring curve is unaffected.
    assert!(aggregate.rms_all.iter().all(|rms| rms.is_finite()));

    // The undefined channel is excluded from the reported range.
    let (min, max) = aggregate.rms_unflagged_range().unwrap();
    assert_abs_diff_eq!(min, aggregate.rms_unflagged[1], epsilon = 0.0);
    assert_abs_diff_eq!(max, aggregate.rms_unflagged[1], epsilon = 0.0);
}

#[test]
fn test_channelisation_mismatch_aborts_before_mutating() {
    let params = default_params();
    let flags = Array3::from_elem((1, 2, 1), false);
    let a = two_antenna_meta(&[10.0], flags.clone(), &[1.0e9, 1.1e9], &[1e6, 1e6]);
    // Same widths, different second frequency.
    let b = two_antenna_meta(&[10.0], flags.clone(), &[1.0e9, 1.15e9], &[1e6, 1e6]);
    // Same frequencies, different first width.
    let c = two_antenna_meta(&[10.0], flags, &[1.0e9, 1.1e9], &[2e6, 1e6]);

    let mut accumulator = NoiseAccumulator::new(
        "a.ms",
        estimate_dataset(&a, &params, None).unwrap(),
    );

    let err = accumulator
        .add_dataset("b.ms", estimate_dataset(&b, &params, None).unwrap())
        .unwrap_err();
    match err {
        NoiseError::ChannelizationMismatch { index, .. } => assert_eq!(index, 1),
        e => panic!("unexpected error: {e}"),
    }

    let err = accumulator
        .add_dataset("c.ms", estimate_dataset(&c, &params, None).unwrap())
        .unwrap_err();
    match err {
        NoiseError::ChannelizationMismatch { index, .. } => assert_eq!(index, 0),
        e => panic!("unexpected error: {e}"),
    }

    // The failed additions must not have touched the accumulator.
    assert_eq!(accumulator.num_datasets(), 1);
    assert_eq!(accumulator.flag_dim(), (1, 2, 1));
}

#[test]
fn test_unknown_field_is_fatal() {
    let params = default_params();
    let flags = Array3::from_elem((1, 1, 1), false);
    let meta = two_antenna_meta(&[10.0], flags, &[1.0e9], &[1e6]);

    let err = estimate_dataset(&meta, &params, Some("nonexistent")).unwrap_err();
    match err {
        NoiseError::FieldNotFound { field, available } => {
            assert_eq!(field, "nonexistent");
            assert_eq!(available, vec!["deep_field".to_string()]);
        }
        e => panic!("unexpected error: {e}"),
    }
}

#[test]
fn test_field_selection_and_autocorrelation_exclusion() {
    let params = default_params();
    // Rows: field 0 cross, field 1 cross, field 0 auto.
    let meta = DatasetMeta {
        field_names: vec!["deep_field".to_string(), "calibrator".to_string()],
        field_ids: vec![0, 1, 0],
        antenna1: vec![0, 0, 1],
        antenna2: vec![1, 1, 1],
        flags: Array3::from_elem((3, 1, 1), false),
        intervals: array![100.0, 50.0, 999.0],
        chan_freqs: array![1.0e9],
        chan_widths: array![1e6],
    };

    let dataset = estimate_dataset(&meta, &params, Some("deep_field")).unwrap();
    assert!(dataset.stats.autos_present);
    assert_eq!(dataset.stats.selected_field_id, Some(0));
    // Only the first row survives: right field, cross-correlation.
    assert_abs_diff_eq!(dataset.intervals.sum(), 100.0, epsilon = 0.0);

    let coeff = SQRT_2 * BOLTZMANN_JY_M2_PER_K * 22.0 / (PI * 6.75 * 6.75);
    assert_abs_diff_eq!(
        dataset.rms[0],
        coeff / (1e6_f64 * 100.0).sqrt(),
        epsilon = 1e-12
    );

    // Without a field selection, both cross-correlation rows contribute but
    // the auto-correlation still does not.
    let dataset = estimate_dataset(&meta, &params, None).unwrap();
    assert_abs_diff_eq!(dataset.intervals.sum(), 150.0, epsilon = 0.0);
}

#[test]
fn test_finite_range_skips_undefined_values() {
    assert_eq!(finite_range(std::iter::empty()), None);
    assert_eq!(finite_range([f64::NAN, f64::INFINITY].into_iter()), None);
    assert_eq!(
        finite_range([2.0, f64::NAN, 1.0, 3.0].into_iter()),
        Some((1.0, 3.0))
    );
}
