//! Result and Error types for fluxnorm-grid

/// Type alias for Result<T, grid::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `fluxnorm-grid` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Axis bounds are not finite, or the minimum is above the maximum
    #[error("invalid bounds for axis \"{name}\" (min {minimum}, max {maximum})")]
    InvalidBounds {
        name: String,
        minimum: f64,
        maximum: f64,
    },

    /// Every axis needs at least one bin
    #[error("axis \"{0}\" has no bins")]
    NoBins(String),

    /// Bin edges must be finite and strictly increasing
    #[error("bin edges for axis \"{0}\" are not strictly increasing")]
    NonIncreasingEdges(String),

    /// A grid with no axes has no cells to normalise
    #[error("grid definition contains no axes")]
    EmptyGrid,

    /// Two output axes claim the same full-space axis
    #[error("full-space axis \"{0}\" is used by more than one output axis")]
    DuplicateSource(String),

    /// An output axis refers to an extra axis that was never declared
    #[error("extra axis \"{0}\" is not declared in the data extents")]
    UnknownExtraAxis(String),

    /// Selector matrices may only contain zeros and ones
    #[error("affine selector entry ({row}, {col}) is {value}, expected 0 or 1")]
    InvalidSelectorEntry { row: usize, col: usize, value: f64 },

    /// At most one full-space coordinate may feed an output axis
    #[error("affine selector row {0} selects more than one full-space axis")]
    AmbiguousSelectorRow(usize),

    /// Selector dimensions do not line up with the grid or the full space
    #[error("inconsistent shape (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Linear index outside of the accumulation grid
    #[error("index {index} out of bounds for grid with {len} cells")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Only finite, non-negative signal may be added to a cell
    #[error("refusing to accumulate invalid contribution {0}")]
    InvalidContribution(f64),

    /// Failure in the shared slice utilities
    #[error("bin search failed: {0}")]
    BinSearch(#[from] fluxnorm_utils::Error),
}
