//! Result and Error types for fluxnorm-norm

/// Type alias for Result<T, norm::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `fluxnorm-norm` crate
///
/// Everything here is fatal to a normalization pass. Problems with individual
/// detectors never surface as errors, they are counted in the
/// [LoopSummary](crate::LoopSummary) instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Run metadata has no incident energy
    #[error("run \"{0}\" has no incident energy")]
    MissingIncidentEnergy(String),

    /// Incident energy must be finite and positive
    #[error("invalid incident energy {0} meV")]
    InvalidIncidentEnergy(f64),

    /// The energy transfer bounds collapse to a single value
    #[error("degenerate energy transfer bounds [{minimum}, {maximum}]")]
    DegenerateEnergyBounds { minimum: f64, maximum: f64 },

    /// Run metadata has no lattice orientation (UB) matrix
    #[error("run \"{0}\" has no lattice orientation matrix")]
    MissingOrientation(String),

    /// The combined goniometer, orientation, and projection cannot be inverted
    #[error("frame transform for run \"{0}\" is singular")]
    SingularFrame(String),

    /// A declared extra axis has no logged value in the run
    #[error("run \"{run}\" has no log value for extra axis \"{axis}\"")]
    MissingExtraAxisLog { run: String, axis: String },

    /// Proton charge must be finite and non-negative
    #[error("run \"{run}\" has invalid proton charge {charge}")]
    InvalidProtonCharge { run: String, charge: f64 },

    /// Nothing to normalise
    #[error("normalization request contains no runs")]
    NoRuns,

    /// Data to normalise does not match the grid
    #[error("data has {found} cells, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Failure in the output grid definition or accumulation
    #[error(transparent)]
    Grid(#[from] fluxnorm_grid::Error),

    /// Failure in the instrument geometry
    #[error(transparent)]
    Instrument(#[from] fluxnorm_instrument::Error),

    /// Failure reading a request from disk
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure parsing a request
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
