//! Integration tests for detector lookup, angles, and deduplication

use fluxnorm_instrument::{
    unique_detectors, Detector, DetectorRecord, Error, InMemoryInstrument, Instrument,
};
use nalgebra::Vector3;
use rstest::{fixture, rstest};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Small ring of detectors around a sample at the origin
///
/// Detector 1 is straight through, 2-5 are at 45 degrees on each side, 6 and
/// 7 share a spectrum, 8 is masked and 9 is a monitor.
#[fixture]
fn ring() -> InMemoryInstrument {
    InMemoryInstrument::new()
        .with_source(Vector3::new(0.0, 0.0, -15.0))
        .with_sample(Vector3::zeros())
        .with_detectors(vec![
            Detector::new(1, Vector3::new(0.0, 0.0, 4.0)),
            Detector::new(2, Vector3::new(4.0, 0.0, 4.0)),
            Detector::new(3, Vector3::new(0.0, 4.0, 4.0)),
            Detector::new(4, Vector3::new(-4.0, 0.0, 4.0)),
            Detector::new(5, Vector3::new(0.0, -4.0, 4.0)),
            Detector::new(6, Vector3::new(4.0, 0.0, 0.0)),
            Detector::new(7, Vector3::new(4.0, 0.1, 0.0)),
            Detector::new(8, Vector3::new(0.0, 4.0, 0.0)).masked(),
            Detector::new(9, Vector3::new(0.0, 0.0, -1.0)).monitor(),
        ])
        .with_group(vec![6, 7])
}

#[rstest]
#[case(1, 0.0, 0.0)] // case 1
#[case(2, FRAC_PI_4, 0.0)] // case 2
#[case(3, FRAC_PI_4, FRAC_PI_2)] // case 3
#[case(4, FRAC_PI_4, PI)] // case 4
#[case(5, FRAC_PI_4, -FRAC_PI_2)] // case 5
#[case(6, FRAC_PI_2, 0.0)] // case 6
fn detector_angles(ring: InMemoryInstrument, #[case] id: i32, #[case] theta: f64, #[case] phi: f64) {
    let beam = ring.beam_geometry().unwrap();
    let record = DetectorRecord::from_detector(&ring.resolve(id).unwrap(), &beam);
    assert_eq!(record.id, id);
    assert!((record.theta - theta).abs() < 1e-12);
    assert!((record.phi - phi).abs() < 1e-12);
}

#[rstest]
#[case(8, Error::MaskedDetector(8))]
#[case(9, Error::MonitorDetector(9))]
#[case(42, Error::DetectorNotFound(42))]
fn unusable_detectors(ring: InMemoryInstrument, #[case] id: i32, #[case] expected: Error) {
    let error = ring.resolve(id).unwrap_err();
    assert!(error.is_per_detector());
    assert_eq!(error, expected);
}

#[rstest]
fn dedup_keeps_unresolvable_ids(ring: InMemoryInstrument) {
    let ids = unique_detectors(&ring, &ring.detector_ids());
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 8, 9]);
}

#[rstest]
fn dedup_through_trait_object(ring: InMemoryInstrument) {
    let instrument: &dyn Instrument = &ring;
    assert_eq!(unique_detectors(instrument, &[7, 6, 1]), vec![6, 1]);
}

#[rstest]
fn fatal_geometry_errors() {
    let no_sample = InMemoryInstrument::new().with_source(Vector3::new(0.0, 0.0, -1.0));
    let error = no_sample.beam_geometry().unwrap_err();
    assert_eq!(error, Error::MissingSample);
    assert!(!error.is_per_detector());
}
