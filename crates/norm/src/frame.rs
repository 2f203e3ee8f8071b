//! Module for mapping instrument-frame vectors into (h, k, l)

// internal modules
use crate::error::{Error, Result};
use crate::run::RunMetadata;

// external crates
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::TAU;

/// Maps scattering vectors in the instrument frame onto (h, k, l)
///
/// Momentum transfer in the laboratory is `Q = 2π · R · UB · W · hkl` for
/// goniometer rotation `R`, lattice orientation `UB`, and projection `W`. The
/// transform is the inverse of that product, built once per run.
///
/// ```rust
/// # use fluxnorm_norm::{FrameTransform, RunMetadata};
/// # use nalgebra::{Matrix3, Vector3};
/// // UB = I/2π makes the whole transform the identity
/// let run = RunMetadata::new("r1").with_ub_matrix(Matrix3::identity() / std::f64::consts::TAU);
/// let frame = FrameTransform::from_run(&run).unwrap();
///
/// let hkl = frame.apply(&Vector3::new(1.0, 2.0, 3.0));
/// assert!((hkl - Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    matrix: Matrix3<f64>,
}

impl FrameTransform {
    /// Build the transform from the run goniometer, UB, and projection
    pub fn from_run(run: &RunMetadata) -> Result<Self> {
        let ub = run
            .ub_matrix
            .ok_or_else(|| Error::MissingOrientation(run.name.clone()))?;
        let w = run.projection.unwrap_or_else(Matrix3::identity);

        let forward = run.goniometer * ub * w * TAU;
        let matrix = forward
            .try_inverse()
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .ok_or_else(|| Error::SingularFrame(run.name.clone()))?;

        Ok(Self { matrix })
    }

    /// Use a precomputed instrument to (h, k, l) matrix directly
    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Identity transform, i.e. the instrument frame is already (h, k, l)
    pub fn identity() -> Self {
        Self::from_matrix(Matrix3::identity())
    }

    /// The instrument to (h, k, l) matrix
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Transform an instrument-frame vector into (h, k, l)
    #[inline]
    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * v
    }
}
