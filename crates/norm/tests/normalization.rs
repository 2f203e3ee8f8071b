//! Integration tests for complete normalization passes

use fluxnorm_grid::{Axis, AxisSource, DataExtents, Extent, FullAxis, GridDefinition};
use fluxnorm_instrument::{Detector, DetectorId, InMemoryInstrument};
use fluxnorm_norm::constants::ENERGY_TO_K;
use fluxnorm_instrument::DetectorRecord;
use fluxnorm_norm::{
    normalize, DimensionCache, Error, FrameTransform, IncidentBeam, NormalizationConfig, NormalizationRequest,
    RunMetadata, Trajectory,
};
use nalgebra::{Matrix3, Vector3};
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Detector scattering about 1.4 degrees in the horizontal plane
fn forward_detector(id: DetectorId) -> Detector {
    Detector::new(id, Vector3::new(0.1, 0.0, 4.0))
}

/// Detectors spread over a cone around the beam
fn detector_fan() -> Vec<Detector> {
    (0..60)
        .map(|i| {
            let theta = 0.01 + 0.005 * i as f64;
            let phi = 0.3 * i as f64;
            let direction = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            Detector::new(i, direction * 4.0)
        })
        .collect()
}

fn aligned_run(name: &str) -> RunMetadata {
    RunMetadata::new(name)
        .with_incident_energy(20.0)
        .with_ub_matrix(Matrix3::identity() / TAU)
}

fn extents() -> DataExtents {
    DataExtents::new(
        Extent::new(-5.0, 5.0),
        Extent::new(-5.0, 5.0),
        Extent::new(-10.0, 10.0),
        Extent::new(-5.0, 15.0),
    )
}

#[fixture]
fn instrument() -> InMemoryInstrument {
    InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detector(forward_detector(1))
}

/// 10 x 10 grid over (h, k), with l and ΔE integrated out
#[fixture]
fn hk_grid() -> GridDefinition {
    GridDefinition::new(vec![
        (Axis::uniform("h", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::H)),
        (Axis::uniform("k", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::K)),
    ])
    .unwrap()
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-9, "{x} != {y}");
    }
}

#[rstest]
fn single_detector_fills_one_cell(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let request = NormalizationRequest::new(hk_grid, extents()).with_run(aligned_run("r1").with_proton_charge(1.5));
    let output = normalize(&request, &instrument).unwrap();

    // h stays within [-0.09, -0.03] and k is exactly zero
    let filled = output
        .signal
        .iter()
        .enumerate()
        .filter(|(_, v)| **v != 0.0)
        .collect::<Vec<_>>();

    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].0, 54);
    assert!((filled[0].1 - 30.0).abs() < 1e-9);

    assert_eq!(output.shape, vec![10, 10]);
    assert_eq!(output.summary.contributed, 1);
    assert_eq!(output.summary.cell_updates, 1);
}

#[rstest]
fn trajectory_leaving_through_the_h_bound(hk_grid: GridDefinition) {
    let theta = 30.0_f64.to_radians();
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detector(Detector::new(7, Vector3::new(theta.sin(), 0.0, theta.cos()) * 4.0));

    let request = NormalizationRequest::new(hk_grid, extents())
        .with_run(aligned_run("r1").with_proton_charge(2.0))
        .with_solid_angles(HashMap::from([(7, 0.5)]));

    let output = normalize(&request, &instrument).unwrap();

    // h = -kf/2 runs from -0.777 at the 15 meV end, across h = -0.8 at
    // kf = 1.6, and leaves the grid at h = -1 where kf = 2
    let inner = 2.56 / ENERGY_TO_K - 5.0;
    let outer = (4.0 - 2.56) / ENERGY_TO_K;

    assert!((output.signal[51] - inner).abs() < 1e-9);
    assert!((output.signal[50] - outer).abs() < 1e-9);
    assert!((output.total() - (4.0 / ENERGY_TO_K - 5.0)).abs() < 1e-9);
    assert_eq!(output.summary.cell_updates, 2);
}

/// The h-k grid with a single energy transfer bin over the whole data range
fn hk_grid_with_energy() -> GridDefinition {
    GridDefinition::new(vec![
        (Axis::uniform("h", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::H)),
        (Axis::uniform("k", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::K)),
        (Axis::uniform("dE", -5.0, 15.0, 1).unwrap(), AxisSource::Full(FullAxis::DeltaE)),
    ])
    .unwrap()
}

#[test]
fn thirty_degree_detector_with_identity_frame() {
    let grid = hk_grid_with_energy();
    let extents = extents();
    let config = NormalizationConfig::default();

    let beam = IncidentBeam::new(20.0, Extent::new(-5.0, 15.0)).unwrap();
    let cache = DimensionCache::new(&grid, &extents, beam, &config);
    let record = DetectorRecord::new(7, 30.0_f64.to_radians(), 0.0);
    let trajectory = Trajectory::new(&record, &FrameTransform::identity(), &beam);

    let points = trajectory.intersections(&cache, config.bounds_tolerance);
    let kf = points.iter().map(|p| p.kf).collect::<Vec<f64>>();

    // the 15 meV end, then the h = -0.8 and h = -1 planes
    assert_eq!(kf.len(), 3);
    assert!((kf[0] - (ENERGY_TO_K * (20.0 - 15.0)).sqrt()).abs() < 1e-12);
    assert!((kf[1] - 1.6).abs() < 1e-12);
    assert!((kf[2] - 2.0).abs() < 1e-12);
    assert!(kf.windows(2).all(|w| w[0] <= w[1]));

    // the -5 meV end is outside of the h bounds
    assert!(kf.iter().all(|k| *k < beam.kf(-5.0)));
    assert!(points.iter().all(|p| p.h >= -1.0 - 1e-9 && p.h <= 1.0 + 1e-9));
}

#[rstest]
fn thirty_degree_detector_fills_two_cells() {
    let theta = 30.0_f64.to_radians();
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detector(Detector::new(7, Vector3::new(theta.sin(), 0.0, theta.cos()) * 4.0));

    let request = NormalizationRequest::new(hk_grid_with_energy(), extents())
        .with_run(aligned_run("r1").with_proton_charge(3.0))
        .with_solid_angles(HashMap::from([(7, 0.5)]));

    let output = normalize(&request, &instrument).unwrap();

    // solid angle times charge times the energy width of each segment
    let kf_start = (ENERGY_TO_K * 5.0).sqrt();
    let width = |kf1: f64, kf2: f64| (kf2 * kf2 - kf1 * kf1) / ENERGY_TO_K;

    assert_eq!(output.shape, vec![10, 10, 1]);
    assert!((output.signal[51] - 1.5 * width(kf_start, 1.6)).abs() < 1e-9);
    assert!((output.signal[50] - 1.5 * width(1.6, 2.0)).abs() < 1e-9);
    assert_eq!(output.summary.cell_updates, 2);
}

#[rstest]
#[case(-5.0, 15.0, 20.0)] // the whole data range
#[case(0.0, 5.0, 5.0)]
#[case(4.0, 6.0, 2.0)]
fn single_energy_bin_clips_the_trajectory(
    instrument: InMemoryInstrument,
    #[case] minimum: f64,
    #[case] maximum: f64,
    #[case] expected: f64,
) {
    let grid = GridDefinition::new(vec![
        (Axis::uniform("h", -1.0, 1.0, 1).unwrap(), AxisSource::Full(FullAxis::H)),
        (Axis::uniform("dE", minimum, maximum, 1).unwrap(), AxisSource::Full(FullAxis::DeltaE)),
    ])
    .unwrap();

    let request = NormalizationRequest::new(grid, extents()).with_run(aligned_run("r1"));
    let output = normalize(&request, &instrument).unwrap();

    assert_eq!(output.signal.len(), 1);
    assert!((output.signal[0] - expected).abs() < 1e-9);
}

#[rstest]
fn energy_bins_split_the_trajectory(instrument: InMemoryInstrument) {
    let grid = GridDefinition::new(vec![(
        Axis::uniform("dE", -5.0, 15.0, 4).unwrap(),
        AxisSource::Full(FullAxis::DeltaE),
    )])
    .unwrap();

    let request = NormalizationRequest::new(grid, extents()).with_run(aligned_run("r1"));
    let output = normalize(&request, &instrument).unwrap();

    assert_close(&output.signal, &[5.0, 5.0, 5.0, 5.0]);
    assert_eq!(output.summary.cell_updates, 4);
}

#[rstest]
fn extra_axis_value_selects_the_bin(instrument: InMemoryInstrument) {
    let grid = GridDefinition::new(vec![
        (Axis::uniform("h", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::H)),
        (
            Axis::uniform("temperature", 0.0, 300.0, 3).unwrap(),
            AxisSource::Extra("temperature".into()),
        ),
    ])
    .unwrap();

    let extents = extents().with_extra("temperature", Extent::new(0.0, 300.0));
    let run = aligned_run("r1").with_log("temperature", 150.0);

    let request = NormalizationRequest::new(grid, extents).with_run(run);
    let output = normalize(&request, &instrument).unwrap();

    assert!((output.signal[14] - 20.0).abs() < 1e-9);
    assert!((output.total() - 20.0).abs() < 1e-9);
}

#[rstest]
fn unusable_detectors_are_counted(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detector(forward_detector(1))
        .with_detector(forward_detector(2).masked())
        .with_detector(forward_detector(3).monitor())
        .with_detector(Detector::new(4, Vector3::new(4.0, 0.0, 0.0)));

    let request = NormalizationRequest::new(hk_grid, extents())
        .with_run(aligned_run("r1"))
        .with_detectors(vec![1, 2, 3, 4, 99]);

    let summary = normalize(&request, &instrument).unwrap().summary;

    assert_eq!(summary.detectors, 5);
    assert_eq!(summary.contributed, 1);
    assert_eq!(summary.masked, 1);
    assert_eq!(summary.monitor, 1);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(summary.missed_grid, 1);
    assert_eq!(summary.skipped(), 4);
}

#[rstest]
fn solid_angles_scale_the_flux(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detector(forward_detector(1))
        .with_detector(forward_detector(2));

    let request = NormalizationRequest::new(hk_grid, extents())
        .with_run(aligned_run("r1").with_proton_charge(2.0))
        .with_solid_angles(HashMap::from([(1, 0.25)]));

    let output = normalize(&request, &instrument).unwrap();

    assert!((output.total() - 10.0).abs() < 1e-9);
    assert_eq!(output.summary.contributed, 1);
    assert_eq!(output.summary.missing_solid_angle, 1);
}

#[rstest]
fn grouped_detectors_count_once(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detectors((1..=3).map(forward_detector))
        .with_group(vec![1, 2, 3]);

    let request = NormalizationRequest::new(hk_grid, extents()).with_run(aligned_run("r1"));
    let output = normalize(&request, &instrument).unwrap();

    assert_eq!(output.summary.detectors, 1);
    assert!((output.total() - 20.0).abs() < 1e-9);
}

#[rstest]
fn runs_accumulate(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let request = NormalizationRequest::new(hk_grid, extents())
        .with_run(aligned_run("r1"))
        .with_run(aligned_run("r2").with_proton_charge(3.0));

    let output = normalize(&request, &instrument).unwrap();

    assert!((output.signal[54] - 80.0).abs() < 1e-9);
    assert_eq!(output.summary.detectors, 2);
}

#[rstest]
fn parallel_matches_sequential(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detectors(detector_fan());

    let sequential = NormalizationRequest::new(hk_grid.clone(), extents())
        .with_run(aligned_run("r1"))
        .with_config(NormalizationConfig::default().with_parallel(false));
    let parallel = sequential
        .clone()
        .with_config(NormalizationConfig::default().with_parallel(true));

    let a = normalize(&sequential, &instrument).unwrap();
    let b = normalize(&parallel, &instrument).unwrap();

    assert!(a.summary.contributed > 0);
    assert_eq!(a.summary, b.summary);
    assert_close(&a.signal, &b.signal);
}

#[rstest]
fn detector_subsets_add_up(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -10.0))
        .with_sample(Vector3::zeros())
        .with_detectors(detector_fan());

    let request = |ids: Vec<DetectorId>| {
        NormalizationRequest::new(hk_grid.clone(), extents())
            .with_run(aligned_run("r1"))
            .with_detectors(ids)
    };

    let all = normalize(&request((0..60).collect()), &instrument).unwrap();
    let first = normalize(&request((0..25).collect()), &instrument).unwrap();
    let second = normalize(&request((25..60).collect()), &instrument).unwrap();

    let combined = first
        .signal
        .iter()
        .zip(&second.signal)
        .map(|(a, b)| a + b)
        .collect::<Vec<f64>>();

    assert_close(&all.signal, &combined);
}

#[rstest]
fn out_of_range_log_skips_the_pass(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let extents = extents().with_extra("temperature", Extent::new(0.0, 10.0));
    let run = aligned_run("r1").with_log("temperature", 50.0);

    let request = NormalizationRequest::new(hk_grid, extents).with_run(run);
    let output = normalize(&request, &instrument).unwrap();

    assert!(output.skipped);
    assert!(output.reason.as_deref().is_some_and(|r| r.contains("temperature")));
    assert_eq!(output.signal.len(), 100);
    assert_eq!(output.total(), 0.0);
    assert_eq!(output.summary.detectors, 0);
}

#[rstest]
fn out_of_range_run_is_left_out(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let extents = extents().with_extra("temperature", Extent::new(0.0, 10.0));

    let request = NormalizationRequest::new(hk_grid, extents)
        .with_run(aligned_run("r1").with_log("temperature", 5.0))
        .with_run(aligned_run("r2").with_log("temperature", 50.0));

    let output = normalize(&request, &instrument).unwrap();

    assert!(!output.skipped);
    assert!((output.total() - 20.0).abs() < 1e-9);
}

#[rstest]
fn output_axis_narrows_the_log_range(instrument: InMemoryInstrument) {
    let grid = GridDefinition::new(vec![(
        Axis::uniform("temperature", 0.0, 5.0, 5).unwrap(),
        AxisSource::Extra("temperature".into()),
    )])
    .unwrap();

    // inside the data, but not the output axis
    let extents = extents().with_extra("temperature", Extent::new(0.0, 10.0));
    let run = aligned_run("r1").with_log("temperature", 7.0);

    let request = NormalizationRequest::new(grid, extents).with_run(run);
    assert!(normalize(&request, &instrument).unwrap().skipped);
}

#[rstest]
fn missing_orientation_is_fatal(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let run = RunMetadata::new("r1").with_incident_energy(20.0);
    let request = NormalizationRequest::new(hk_grid, extents()).with_run(run);

    assert!(matches!(
        normalize(&request, &instrument),
        Err(Error::MissingOrientation(name)) if name == "r1"
    ));
}

#[rstest]
fn missing_incident_energy_is_fatal(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let run = RunMetadata::new("r1").with_ub_matrix(Matrix3::identity());
    let request = NormalizationRequest::new(hk_grid, extents()).with_run(run);

    assert!(matches!(
        normalize(&request, &instrument),
        Err(Error::MissingIncidentEnergy(_))
    ));
}

#[rstest]
fn missing_extra_log_is_fatal(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let extents = extents().with_extra("temperature", Extent::new(0.0, 10.0));
    let request = NormalizationRequest::new(hk_grid, extents).with_run(aligned_run("r1"));

    assert!(matches!(
        normalize(&request, &instrument),
        Err(Error::MissingExtraAxisLog { axis, .. }) if axis == "temperature"
    ));
}

#[rstest]
fn no_runs_is_fatal(instrument: InMemoryInstrument, hk_grid: GridDefinition) {
    let request = NormalizationRequest::new(hk_grid, extents());
    assert!(matches!(normalize(&request, &instrument), Err(Error::NoRuns)));
}

#[rstest]
fn missing_source_is_fatal(hk_grid: GridDefinition) {
    let instrument = InMemoryInstrument::new()
        .with_sample(Vector3::zeros())
        .with_detector(forward_detector(1));

    let request = NormalizationRequest::new(hk_grid, extents()).with_run(aligned_run("r1"));
    assert!(matches!(
        normalize(&request, &instrument),
        Err(Error::Instrument(fluxnorm_instrument::Error::MissingSource))
    ));
}
