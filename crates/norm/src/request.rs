//! Module for describing a complete normalization pass

// internal modules
use crate::config::NormalizationConfig;
use crate::error::Result;
use crate::run::RunMetadata;

// fluxnorm modules
use fluxnorm_grid::{DataExtents, GridDefinition};
use fluxnorm_instrument::DetectorId;

// external crates
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything needed for a normalization pass except the instrument
///
/// ```json
/// {
///   "grid": [
///     { "axis": { "name": "h", "minimum": -1.0, "maximum": 1.0, "n_bins": 20 }, "source": { "full": "h" } },
///     { "axis": { "name": "dE", "minimum": -5.0, "maximum": 15.0, "n_bins": 40 }, "source": { "full": "delta_e" } }
///   ],
///   "extents": {
///     "h": { "minimum": -3.0, "maximum": 3.0 },
///     "k": { "minimum": -3.0, "maximum": 3.0 },
///     "l": { "minimum": -0.1, "maximum": 0.1 },
///     "delta_e": { "minimum": -5.0, "maximum": 15.0 }
///   },
///   "runs": [ { "name": "run_0041", "incident_energy": 20.0, "ub_matrix": [[...]] } ],
///   "solid_angles": { "1": 0.0012, "2": 0.0011 },
///   "config": { "parallel": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRequest {
    /// Output grid to fill
    pub grid: GridDefinition,
    /// Extents of the original data
    pub extents: DataExtents,
    /// Runs to normalise into the same grid
    pub runs: Vec<RunMetadata>,
    /// Per-detector solid angles, proton charge only if not given
    #[serde(default)]
    pub solid_angles: Option<HashMap<DetectorId, f64>>,
    /// Detectors to use, every instrument detector if not given
    #[serde(default)]
    pub detectors: Option<Vec<DetectorId>>,
    /// Numerical and scheduling options
    #[serde(default)]
    pub config: NormalizationConfig,
}

impl NormalizationRequest {
    /// New request with no runs, using every detector and default options
    pub fn new(grid: GridDefinition, extents: DataExtents) -> Self {
        Self {
            grid,
            extents,
            runs: Vec::new(),
            solid_angles: None,
            detectors: None,
            config: NormalizationConfig::default(),
        }
    }

    /// Add a run
    pub fn with_run(mut self, run: RunMetadata) -> Self {
        self.runs.push(run);
        self
    }

    /// Set per-detector solid angles
    pub fn with_solid_angles(mut self, solid_angles: HashMap<DetectorId, f64>) -> Self {
        self.solid_angles = Some(solid_angles);
        self
    }

    /// Restrict the pass to a set of detectors
    pub fn with_detectors(mut self, ids: Vec<DetectorId>) -> Self {
        self.detectors = Some(ids);
        self
    }

    /// Set the numerical and scheduling options
    pub fn with_config(mut self, config: NormalizationConfig) -> Self {
        self.config = config;
        self
    }
}

/// Read a [NormalizationRequest] from a JSON file
///
/// ```rust, no_run
/// # use fluxnorm_norm::read_json;
/// let request = read_json("path/to/request.json").unwrap();
/// ```
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<NormalizationRequest> {
    let path: &Path = Path::new(path.as_ref());
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Parse a [NormalizationRequest] from JSON text
pub fn from_json_str(text: &str) -> Result<NormalizationRequest> {
    Ok(serde_json::from_str(text)?)
}
