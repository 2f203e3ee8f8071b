//! Physical constants used for converting energy to wavevector

use std::f64::consts::PI;

/// Neutron mass (kg)
pub const NEUTRON_MASS: f64 = 1.674_927_351e-27;

/// One milli-electronvolt (J)
pub const MILLI_EV: f64 = 1.602_176_634e-22;

/// Planck constant (J s)
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Conversion from energy (meV) to squared wavevector (Å⁻²)
///
/// `k² = ENERGY_TO_K · E`, which is roughly 0.4826.
///
/// ```rust
/// # use fluxnorm_norm::constants::ENERGY_TO_K;
/// assert!((ENERGY_TO_K - 0.482_6).abs() < 1e-4);
/// ```
pub const ENERGY_TO_K: f64 = 8.0 * PI * PI * NEUTRON_MASS * MILLI_EV * 1.0e-20 / (PLANCK * PLANCK);
