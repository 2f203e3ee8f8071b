//! Result and Error types for fluxnorm-instrument

use crate::detector::DetectorId;

/// Type alias for Result<T, instrument::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `fluxnorm-instrument` crate
///
/// The detector variants are recoverable, and only ever mean that one
/// detector is skipped. Anything to do with the source or sample is fatal.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// No detector with this id exists in the instrument
    #[error("detector {0} not found")]
    DetectorNotFound(DetectorId),

    /// Detector exists but is masked
    #[error("detector {0} is masked")]
    MaskedDetector(DetectorId),

    /// Detector is a monitor channel rather than a scattering detector
    #[error("detector {0} is a monitor")]
    MonitorDetector(DetectorId),

    /// Detector does not share a spectrum with any other
    #[error("detector {0} is not part of a group")]
    NotGrouped(DetectorId),

    /// The instrument has no source position
    #[error("instrument does not define a source")]
    MissingSource,

    /// The instrument has no sample position
    #[error("instrument does not define a sample position")]
    MissingSample,

    /// Source and sample coincide, so there is no beam direction
    #[error("source and sample positions coincide")]
    DegenerateBeam,
}

impl Error {
    /// Check if the error only affects a single detector
    pub fn is_per_detector(&self) -> bool {
        matches!(
            self,
            Error::DetectorNotFound(_)
                | Error::MaskedDetector(_)
                | Error::MonitorDetector(_)
                | Error::NotGrouped(_)
        )
    }
}
