//! Module for the result of a normalization pass

// internal modules
use crate::error::{Error, Result};
use crate::summary::LoopSummary;

// external crates
use serde::{Deserialize, Serialize};

/// The filled normalization grid and how it was produced
///
/// Cells are in the same order as the output grid, first axis fastest. When
/// the requested region lies entirely outside the measured data the pass is
/// skipped, every cell is zero, and `reason` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOutput {
    /// Accumulated flux for every cell
    pub signal: Vec<f64>,
    /// Number of bins along each output axis
    pub shape: Vec<usize>,
    /// Whether normalization was skipped entirely
    pub skipped: bool,
    /// Why normalization was skipped
    pub reason: Option<String>,
    /// Detector counts over every run
    pub summary: LoopSummary,
}

impl NormalizationOutput {
    /// Output of a completed pass
    pub fn new(signal: Vec<f64>, shape: Vec<usize>, summary: LoopSummary) -> Self {
        Self {
            signal,
            shape,
            skipped: false,
            reason: None,
            summary,
        }
    }

    /// Output of a pass that was skipped without doing any work
    pub fn skipped(n_cells: usize, shape: Vec<usize>, reason: impl Into<String>) -> Self {
        Self {
            signal: vec![0.0; n_cells],
            shape,
            skipped: true,
            reason: Some(reason.into()),
            summary: LoopSummary::default(),
        }
    }

    /// Total flux over every cell
    pub fn total(&self) -> f64 {
        self.signal.iter().sum()
    }

    /// Divide unnormalized data by the accumulated flux, cell by cell
    ///
    /// Cells that saw no flux are unmeasured, and come out as `NaN` whatever
    /// the data says.
    ///
    /// ```rust
    /// # use fluxnorm_norm::{LoopSummary, NormalizationOutput};
    /// let output = NormalizationOutput::new(vec![2.0, 0.0, 4.0], vec![3], LoopSummary::default());
    /// let normalized = output.normalize(&[1.0, 5.0, 2.0]).unwrap();
    ///
    /// assert_eq!(normalized[0], 0.5);
    /// assert!(normalized[1].is_nan());
    /// assert_eq!(normalized[2], 0.5);
    ///
    /// assert!(output.normalize(&[1.0]).is_err());
    /// ```
    pub fn normalize(&self, data: &[f64]) -> Result<Vec<f64>> {
        if data.len() != self.signal.len() {
            return Err(Error::ShapeMismatch {
                expected: self.signal.len(),
                found: data.len(),
            });
        }

        Ok(data
            .iter()
            .zip(&self.signal)
            .map(|(d, n)| if *n == 0.0 { f64::NAN } else { d / n })
            .collect())
    }
}
