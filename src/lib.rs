//! `fluxnorm` is a semi-modular toolkit for building flux normalization grids
//! for single-crystal, direct-geometry inelastic neutron scattering
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use fluxnorm_utils as utils;

#[cfg(feature = "grid")]
#[cfg_attr(docsrs, doc(cfg(feature = "grid")))]
#[doc(inline)]
pub use fluxnorm_grid as grid;

#[cfg(feature = "instrument")]
#[cfg_attr(docsrs, doc(cfg(feature = "instrument")))]
#[doc(inline)]
pub use fluxnorm_instrument as instrument;

#[cfg(feature = "norm")]
#[cfg_attr(docsrs, doc(cfg(feature = "norm")))]
#[doc(inline)]
pub use fluxnorm_norm as norm;
