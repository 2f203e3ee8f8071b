//! Output grid definitions and accumulation for flux normalization
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod accumulation;
mod affine;
mod axis;
mod definition;
mod error;

#[doc(inline)]
pub use axis::Axis;

#[doc(inline)]
pub use definition::{AxisSource, DataExtents, Extent, ExtraAxis, FullAxis, GridDefinition, OutputAxis};

#[doc(inline)]
pub use affine::AffineIndexMatrix;

#[doc(inline)]
pub use accumulation::AccumulationGrid;

#[doc(inline)]
pub use error::{Error, Result};
