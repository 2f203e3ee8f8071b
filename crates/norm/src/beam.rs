//! Module for the incident beam state of a single run

// internal modules
use crate::constants::ENERGY_TO_K;
use crate::error::{Error, Result};

// fluxnorm modules
use fluxnorm_grid::Extent;

/// Incident energy and the final wavevector range it allows
///
/// Energy transfer and final wavevector run in opposite directions, so
/// `kf_min` comes from the largest energy transfer of the range and `kf_max`
/// from the smallest.
///
/// ```rust
/// # use fluxnorm_norm::IncidentBeam;
/// # use fluxnorm_grid::Extent;
/// let beam = IncidentBeam::new(20.0, Extent::new(-5.0, 15.0)).unwrap();
///
/// assert!((beam.kf(15.0) - beam.kf_min()).abs() < 1e-12);
/// assert!((beam.kf(-5.0) - beam.kf_max()).abs() < 1e-12);
/// assert!((beam.energy_transfer(beam.ki()) - 0.0).abs() < 1e-12);
///
/// // energy transfer above the incident energy is clamped
/// assert_eq!(beam.kf(25.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentBeam {
    ei: f64,
    ki: f64,
    kf_min: f64,
    kf_max: f64,
    energy_to_k: f64,
}

impl IncidentBeam {
    /// Beam state for an incident energy (meV) and energy transfer extent
    pub fn new(ei: f64, delta_e: Extent) -> Result<Self> {
        Self::with_constant(ei, delta_e, ENERGY_TO_K)
    }

    /// Same as [new()](IncidentBeam::new) with an explicit conversion constant
    pub fn with_constant(ei: f64, delta_e: Extent, energy_to_k: f64) -> Result<Self> {
        if !(ei.is_finite() && ei > 0.0) {
            return Err(Error::InvalidIncidentEnergy(ei));
        }

        if !(delta_e.is_valid() && delta_e.maximum > delta_e.minimum) {
            return Err(Error::DegenerateEnergyBounds {
                minimum: delta_e.minimum,
                maximum: delta_e.maximum,
            });
        }

        let mut beam = Self {
            ei,
            ki: (energy_to_k * ei).sqrt(),
            kf_min: 0.0,
            kf_max: 0.0,
            energy_to_k,
        };
        beam.kf_min = beam.kf(delta_e.maximum);
        beam.kf_max = beam.kf(delta_e.minimum);
        Ok(beam)
    }

    /// Incident energy (meV)
    pub fn ei(&self) -> f64 {
        self.ei
    }

    /// Incident wavevector magnitude
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Smallest final wavevector, at the largest energy transfer
    pub fn kf_min(&self) -> f64 {
        self.kf_min
    }

    /// Largest final wavevector, at the smallest energy transfer
    pub fn kf_max(&self) -> f64 {
        self.kf_max
    }

    /// Energy to squared wavevector conversion in use
    pub fn energy_to_k(&self) -> f64 {
        self.energy_to_k
    }

    /// Final wavevector for an energy transfer, clamped to zero
    #[inline]
    pub fn kf(&self, energy_transfer: f64) -> f64 {
        (self.energy_to_k * (self.ei - energy_transfer)).max(0.0).sqrt()
    }

    /// Energy transfer for a final wavevector
    #[inline]
    pub fn energy_transfer(&self, kf: f64) -> f64 {
        self.ei - kf * kf / self.energy_to_k
    }

    /// Energy difference between two final wavevectors, `(kf2² - kf1²) / C`
    #[inline]
    pub fn energy_between(&self, kf1: f64, kf2: f64) -> f64 {
        (kf2 * kf2 - kf1 * kf1) / self.energy_to_k
    }
}
