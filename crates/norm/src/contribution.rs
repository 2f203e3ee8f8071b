//! Module for turning trajectory segments into grid contributions

// internal modules
use crate::beam::IncidentBeam;
use crate::error::Result;
use crate::trajectory::Intersection;

// fluxnorm modules
use fluxnorm_grid::{AccumulationGrid, AffineIndexMatrix, FullAxis, GridDefinition};

// external crates
use itertools::Itertools;

/// Adds the flux along sorted intersections into the accumulation grid
///
/// Each pair of neighbouring intersections is a segment inside one output
/// cell, found from the segment midpoint. The flux through a segment is the
/// energy width it spans, scaled by the proton charge and solid angle of the
/// detector.
#[derive(Debug, Clone, Copy)]
pub struct Accumulator<'a> {
    grid: &'a GridDefinition,
    affine: &'a AffineIndexMatrix,
    beam: &'a IncidentBeam,
    extras: &'a [f64],
    delta_threshold: f64,
}

impl<'a> Accumulator<'a> {
    /// Accumulator for one run
    ///
    /// `extras` are the values of every extra axis for the run, in full-space
    /// column order.
    pub fn new(
        grid: &'a GridDefinition,
        affine: &'a AffineIndexMatrix,
        beam: &'a IncidentBeam,
        extras: &'a [f64],
        delta_threshold: f64,
    ) -> Self {
        Self {
            grid,
            affine,
            beam,
            extras,
            delta_threshold,
        }
    }

    /// Add every segment of a trajectory, returning the number of cell updates
    ///
    /// Segments with an energy width below the threshold contribute nothing,
    /// and neither do segments whose midpoint falls outside of the grid.
    pub fn add_trajectory(&self, points: &[Intersection], scale: f64, signal: &AccumulationGrid) -> Result<usize> {
        let n_primary = FullAxis::ALL.len();
        let mut full = vec![0.0; n_primary + self.extras.len()];
        full[n_primary..].copy_from_slice(self.extras);

        let mut updates = 0;
        for (previous, current) in points.iter().tuple_windows() {
            let delta = self.beam.energy_between(previous.kf, current.kf);
            if delta < self.delta_threshold {
                continue;
            }

            let mid = previous.midpoint(current);
            full[..3].copy_from_slice(&mid.hkl());
            full[FullAxis::DeltaE.index()] = self.beam.energy_transfer(mid.kf);

            if let Some(index) = self.affine.linear_index(self.grid, &full) {
                signal.add(index, scale * delta)?;
                updates += 1;
            }
        }

        Ok(updates)
    }
}
