//! Module for counting what happened to every detector

// fluxnorm modules
use fluxnorm_instrument::Error as InstrumentError;
use fluxnorm_utils::f;

// external crates
use serde::{Deserialize, Serialize};

/// What happened to a single detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorOutcome {
    /// Added to at least one cell
    Contributed {
        /// Number of cell updates made
        updates: usize,
    },
    /// Trajectory never entered the grid
    MissedGrid,
    /// Detector id could not be resolved
    Unresolved,
    /// Detector is masked
    Masked,
    /// Detector is a monitor
    Monitor,
    /// Solid angles were given, but not for this detector
    MissingSolidAngle,
    /// Accumulation failed for this detector
    Failed,
}

impl From<&InstrumentError> for DetectorOutcome {
    fn from(error: &InstrumentError) -> Self {
        match error {
            InstrumentError::MaskedDetector(_) => DetectorOutcome::Masked,
            InstrumentError::MonitorDetector(_) => DetectorOutcome::Monitor,
            _ => DetectorOutcome::Unresolved,
        }
    }
}

/// Counts of detector outcomes over a loop
///
/// Summaries are built up independently on every worker and merged, so
/// the detector loop never has to share them.
///
/// ```rust
/// # use fluxnorm_norm::{DetectorOutcome, LoopSummary};
/// let a = LoopSummary::default()
///     .record(DetectorOutcome::Contributed { updates: 3 })
///     .record(DetectorOutcome::Masked);
/// let b = LoopSummary::default().record(DetectorOutcome::MissedGrid);
///
/// let total = a.merge(b);
/// assert_eq!(total.detectors, 3);
/// assert_eq!(total.contributed, 1);
/// assert_eq!(total.cell_updates, 3);
/// assert_eq!(total.skipped(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSummary {
    /// Detectors processed in total
    pub detectors: usize,
    /// Detectors that added signal
    pub contributed: usize,
    /// Detectors whose trajectory missed the grid
    pub missed_grid: usize,
    /// Detectors that could not be resolved
    pub unresolved: usize,
    /// Masked detectors
    pub masked: usize,
    /// Monitor detectors
    pub monitor: usize,
    /// Detectors without a solid angle
    pub missing_solid_angle: usize,
    /// Detectors where accumulation failed
    pub failed: usize,
    /// Total number of cell updates
    pub cell_updates: usize,
}

impl LoopSummary {
    /// Count one more detector outcome
    pub fn record(mut self, outcome: DetectorOutcome) -> Self {
        self.detectors += 1;
        match outcome {
            DetectorOutcome::Contributed { updates } => {
                self.contributed += 1;
                self.cell_updates += updates;
            }
            DetectorOutcome::MissedGrid => self.missed_grid += 1,
            DetectorOutcome::Unresolved => self.unresolved += 1,
            DetectorOutcome::Masked => self.masked += 1,
            DetectorOutcome::Monitor => self.monitor += 1,
            DetectorOutcome::MissingSolidAngle => self.missing_solid_angle += 1,
            DetectorOutcome::Failed => self.failed += 1,
        }
        self
    }

    /// Combine two summaries
    pub fn merge(self, other: LoopSummary) -> Self {
        Self {
            detectors: self.detectors + other.detectors,
            contributed: self.contributed + other.contributed,
            missed_grid: self.missed_grid + other.missed_grid,
            unresolved: self.unresolved + other.unresolved,
            masked: self.masked + other.masked,
            monitor: self.monitor + other.monitor,
            missing_solid_angle: self.missing_solid_angle + other.missing_solid_angle,
            failed: self.failed + other.failed,
            cell_updates: self.cell_updates + other.cell_updates,
        }
    }

    /// Detectors that did not contribute for any reason
    pub fn skipped(&self) -> usize {
        self.detectors - self.contributed
    }
}

impl std::fmt::Display for LoopSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let skips = [
            ("missed grid", self.missed_grid),
            ("unresolved", self.unresolved),
            ("masked", self.masked),
            ("monitor", self.monitor),
            ("no solid angle", self.missing_solid_angle),
            ("failed", self.failed),
        ]
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(reason, n)| f!("{n} {reason}"))
        .collect::<Vec<String>>();

        write!(
            f,
            "{}/{} detectors contributed ({} cell updates)",
            self.contributed, self.detectors, self.cell_updates
        )?;

        if !skips.is_empty() {
            write!(f, ", skipped {}", skips.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_errors_map_to_outcomes() {
        assert_eq!(
            DetectorOutcome::from(&InstrumentError::MaskedDetector(1)),
            DetectorOutcome::Masked
        );
        assert_eq!(
            DetectorOutcome::from(&InstrumentError::MonitorDetector(1)),
            DetectorOutcome::Monitor
        );
        assert_eq!(
            DetectorOutcome::from(&InstrumentError::DetectorNotFound(1)),
            DetectorOutcome::Unresolved
        );
    }

    #[test]
    fn display_lists_only_nonzero_skips() {
        let summary = LoopSummary::default()
            .record(DetectorOutcome::Contributed { updates: 4 })
            .record(DetectorOutcome::Monitor)
            .record(DetectorOutcome::Monitor);

        assert_eq!(
            summary.to_string(),
            "1/3 detectors contributed (4 cell updates), skipped 2 monitor"
        );
        assert_eq!(
            LoopSummary::default().to_string(),
            "0/0 detectors contributed (0 cell updates)"
        );
    }
}
