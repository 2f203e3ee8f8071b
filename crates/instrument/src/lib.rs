//! Instrument geometry for flux normalization
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod dedup;
mod detector;
mod error;
mod geometry;
mod instrument;

#[doc(inline)]
pub use detector::{Detector, DetectorId, DetectorRecord};

#[doc(inline)]
pub use geometry::BeamGeometry;

#[doc(inline)]
pub use instrument::{InMemoryInstrument, Instrument};

#[doc(inline)]
pub use dedup::unique_detectors;

#[doc(inline)]
pub use error::{Error, Result};
