//! Flux normalization of reciprocal space and energy transfer grids
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
pub mod constants;

mod beam;
mod cache;
mod config;
mod contribution;
mod error;
mod frame;
mod normalize;
mod output;
mod request;
mod run;
mod summary;
mod trajectory;

#[doc(inline)]
pub use normalize::normalize;

#[doc(inline)]
pub use request::{from_json_str, read_json, NormalizationRequest};

#[doc(inline)]
pub use output::NormalizationOutput;

#[doc(inline)]
pub use config::NormalizationConfig;

#[doc(inline)]
pub use run::RunMetadata;

#[doc(inline)]
pub use beam::IncidentBeam;

#[doc(inline)]
pub use frame::FrameTransform;

#[doc(inline)]
pub use cache::{AxisCache, DimensionCache};

#[doc(inline)]
pub use trajectory::{Intersection, Trajectory};

#[doc(inline)]
pub use contribution::Accumulator;

#[doc(inline)]
pub use summary::{DetectorOutcome, LoopSummary};

#[doc(inline)]
pub use error::{Error, Result};
