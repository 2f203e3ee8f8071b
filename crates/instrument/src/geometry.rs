//! Module for the beam geometry used to work out scattering angles

// internal modules
use crate::error::{Error, Result};

// external crates
use nalgebra::{Unit, Vector3};

/// Source and sample positions, and the beam direction between them
///
/// The beam direction defines the polar axis for every detector. Scattering
/// angles are measured from the sample position.
///
/// ```rust
/// # use fluxnorm_instrument::BeamGeometry;
/// # use nalgebra::Vector3;
/// let beam = BeamGeometry::new(Vector3::new(0.0, 0.0, -10.0), Vector3::zeros()).unwrap();
///
/// // detector at 90 degrees in the horizontal plane
/// let (theta, phi) = beam.angles(&Vector3::new(2.0, 0.0, 0.0));
/// assert!((theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// assert_eq!(phi, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamGeometry {
    source: Vector3<f64>,
    sample: Vector3<f64>,
    beam_direction: Unit<Vector3<f64>>,
}

impl BeamGeometry {
    /// Beam from the source towards the sample
    pub fn new(source: Vector3<f64>, sample: Vector3<f64>) -> Result<Self> {
        let beam_direction = Unit::try_new(sample - source, f64::EPSILON).ok_or(Error::DegenerateBeam)?;
        Ok(Self {
            source,
            sample,
            beam_direction,
        })
    }

    /// Source position
    pub fn source(&self) -> &Vector3<f64> {
        &self.source
    }

    /// Sample position
    pub fn sample(&self) -> &Vector3<f64> {
        &self.sample
    }

    /// Unit vector from source to sample
    pub fn beam_direction(&self) -> &Vector3<f64> {
        self.beam_direction.as_ref()
    }

    /// Polar and azimuthal angle `(theta, phi)` of a position in radians
    ///
    /// Theta is the angle between the beam and the sample-to-position vector.
    /// Phi is the azimuth of that vector in the laboratory x-y plane.
    pub fn angles(&self, position: &Vector3<f64>) -> (f64, f64) {
        let scattered = position - self.sample;
        let theta = self.beam_direction.angle(&scattered);
        let phi = scattered.y.atan2(scattered.x);
        (theta, phi)
    }
}
