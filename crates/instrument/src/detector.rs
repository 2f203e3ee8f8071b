//! Module for detectors and their scattering angles

// internal modules
use crate::geometry::BeamGeometry;

// external crates
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Detector identifier as used by the instrument definition
pub type DetectorId = i32;

/// A single detector pixel of the instrument
///
/// Positions are in the laboratory frame, in the same units as the source and
/// sample positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    /// Unique detector id
    pub id: DetectorId,
    /// Position in the laboratory frame
    pub position: Vector3<f64>,
    /// Monitor channels are never normalised
    #[serde(default)]
    pub is_monitor: bool,
    /// Masked detectors are skipped
    #[serde(default)]
    pub is_masked: bool,
}

impl Detector {
    /// New unmasked, non-monitor detector at the given position
    pub fn new(id: DetectorId, position: Vector3<f64>) -> Self {
        Self {
            id,
            position,
            is_monitor: false,
            is_masked: false,
        }
    }

    /// Mark as a monitor
    pub fn monitor(mut self) -> Self {
        self.is_monitor = true;
        self
    }

    /// Mark as masked
    pub fn masked(mut self) -> Self {
        self.is_masked = true;
        self
    }
}

/// Scattering angles of one detector
///
/// Only ever lives for the duration of one detector's contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorRecord {
    /// Detector id
    pub id: DetectorId,
    /// Polar angle from the beam direction (radians)
    pub theta: f64,
    /// Azimuthal angle about the beam direction (radians)
    pub phi: f64,
}

impl DetectorRecord {
    /// Record with explicit angles
    pub fn new(id: DetectorId, theta: f64, phi: f64) -> Self {
        Self { id, theta, phi }
    }

    /// Work out the angles of a detector relative to the beam
    pub fn from_detector(detector: &Detector, beam: &BeamGeometry) -> Self {
        let (theta, phi) = beam.angles(&detector.position);
        Self::new(detector.id, theta, phi)
    }

    /// Unit vector along the outgoing direction, in the instrument frame
    ///
    /// ```rust
    /// # use fluxnorm_instrument::DetectorRecord;
    /// let forward = DetectorRecord::new(1, 0.0, 0.0).scattering_direction();
    /// assert_eq!(forward, nalgebra::Vector3::new(0.0, 0.0, 1.0));
    ///
    /// let side = DetectorRecord::new(2, std::f64::consts::FRAC_PI_2, 0.0).scattering_direction();
    /// assert!((side.x - 1.0).abs() < 1e-12);
    /// assert!(side.z.abs() < 1e-12);
    /// ```
    pub fn scattering_direction(&self) -> Vector3<f64> {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Vector3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_flags() {
        let detector = Detector::new(3, Vector3::new(0.0, 0.0, 1.0)).masked();
        assert!(detector.is_masked);
        assert!(!detector.is_monitor);
        assert!(Detector::new(4, Vector3::zeros()).monitor().is_monitor);
    }

    #[test]
    fn direction_is_unit() {
        let record = DetectorRecord::new(1, 0.7, -2.1);
        assert!((record.scattering_direction().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flags_default_when_missing() {
        let detector: Detector = serde_json::from_str(r#"{"id":5,"position":[1.0,0.0,4.0]}"#).unwrap();
        assert_eq!(detector, Detector::new(5, Vector3::new(1.0, 0.0, 4.0)));
    }
}
