//! Module for tuning the normalization pass

// external crates
use serde::{Deserialize, Serialize};

/// Numerical and scheduling options for a normalization pass
///
/// The defaults are fine for almost everything.
///
/// ```rust
/// # use fluxnorm_norm::NormalizationConfig;
/// let config = NormalizationConfig::default()
///     .with_parallel(false)
///     .with_delta_threshold(1e-8);
///
/// assert!(!config.parallel);
/// assert_eq!(config.delta_threshold, 1e-8);
/// assert_eq!(config.bounds_tolerance, 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Process detectors in parallel
    pub parallel: bool,
    /// Trajectory segments with a smaller energy width (meV) are skipped
    pub delta_threshold: f64,
    /// Absolute tolerance on the reciprocal axis bounds
    pub bounds_tolerance: f64,
    /// Degeneracy tolerance as a fraction of the bin width
    pub degeneracy_factor: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            delta_threshold: 1e-10,
            bounds_tolerance: 1e-9,
            degeneracy_factor: 1e-7,
        }
    }
}

impl NormalizationConfig {
    /// Set whether detectors are processed in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the smallest segment energy width that contributes
    pub fn with_delta_threshold(mut self, threshold: f64) -> Self {
        self.delta_threshold = threshold;
        self
    }

    /// Set the absolute tolerance on reciprocal axis bounds
    pub fn with_bounds_tolerance(mut self, tolerance: f64) -> Self {
        self.bounds_tolerance = tolerance;
        self
    }

    /// Set the degeneracy tolerance as a fraction of the bin width
    pub fn with_degeneracy_factor(mut self, factor: f64) -> Self {
        self.degeneracy_factor = factor;
        self
    }
}
