//! Result and Error types for fluxnorm-utils

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for `fluxnorm_utils`
///
/// Only bin searches can fail. Both cases are routine for a caller asking
/// whether a coordinate lands in a grid at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Value is below the first edge, above the last, or NaN
    OutsideEdges { value: f64, first: f64, last: f64 },

    /// Fewer than two edges, so there is no bin to search
    TooFewEdges { found: usize },
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::OutsideEdges { value, first, last } => {
                write!(fmt, "{value} is outside of the bin edges [{first}, {last}]")
            }
            Error::TooFewEdges { found } => {
                write!(fmt, "need at least 2 bin edges, found {found}")
            }
        }
    }
}

impl std::error::Error for Error {}
