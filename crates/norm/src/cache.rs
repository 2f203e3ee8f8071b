//! Module for the per-run cache of axis bounds and crossing planes

// internal modules
use crate::beam::IncidentBeam;
use crate::config::NormalizationConfig;

// fluxnorm modules
use fluxnorm_grid::{DataExtents, Extent, FullAxis, GridDefinition};
use fluxnorm_utils::FloatExt;

/// Bounds and crossing planes for one reciprocal axis
///
/// Integrated axes keep only their bounds. Non-integrated axes also keep the
/// interior bin edges, i.e. everything strictly between the bounds, since the
/// bounds themselves are always tested separately.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCache {
    /// Lower bound of the axis
    pub minimum: f64,
    /// Upper bound of the axis
    pub maximum: f64,
    /// Interior bin edges, `None` if the axis is integrated
    pub edges: Option<Vec<f64>>,
    /// Trajectories with a smaller extent along this axis are degenerate
    pub degeneracy_tolerance: f64,
}

impl AxisCache {
    /// Cache for an axis of the output grid, or of the original data if the
    /// axis was not kept
    fn new(grid: &GridDefinition, extents: &DataExtents, axis: FullAxis, factor: f64) -> Self {
        match grid.output_axis(axis) {
            Some(output) if !output.is_single_bin() => {
                let edges = output.edges();
                Self {
                    minimum: output.minimum(),
                    maximum: output.maximum(),
                    edges: Some(edges[1..edges.len() - 1].to_vec()),
                    degeneracy_tolerance: factor * output.min_bin_width(),
                }
            }
            Some(output) => Self::integrated(Extent::from(output), factor),
            None => Self::integrated(extents.get(axis), factor),
        }
    }

    fn integrated(extent: Extent, factor: f64) -> Self {
        Self {
            minimum: extent.minimum,
            maximum: extent.maximum,
            edges: None,
            degeneracy_tolerance: factor * extent.width().max(f64::EPSILON),
        }
    }

    /// Check if the axis is integrated out of the output grid
    pub fn is_integrated(&self) -> bool {
        self.edges.is_none()
    }

    /// Check if a value is within the bounds, allowing for `tol` either side
    #[inline]
    pub fn contains(&self, value: f64, tol: f64) -> bool {
        value.is_within(self.minimum, self.maximum, tol)
    }
}

/// Everything about the axes that stays fixed for the duration of a run
///
/// The reciprocal axes only depend on the grid, but the energy transfer
/// edges are stored as final wavevectors and so depend on the incident energy.
///
/// ```rust
/// # use fluxnorm_grid::{Axis, AxisSource, DataExtents, Extent, FullAxis, GridDefinition};
/// # use fluxnorm_norm::{DimensionCache, IncidentBeam, NormalizationConfig};
/// let grid = GridDefinition::new(vec![
///     (Axis::uniform("h", -1.0, 1.0, 4).unwrap(), AxisSource::Full(FullAxis::H)),
///     (Axis::uniform("dE", 0.0, 10.0, 5).unwrap(), AxisSource::Full(FullAxis::DeltaE)),
/// ])
/// .unwrap();
///
/// let extents = DataExtents::new(
///     Extent::new(-2.0, 2.0),
///     Extent::new(-3.0, 3.0),
///     Extent::new(-4.0, 4.0),
///     Extent::new(0.0, 10.0),
/// );
///
/// let beam = IncidentBeam::new(12.0, extents.delta_e).unwrap();
/// let cache = DimensionCache::new(&grid, &extents, beam, &NormalizationConfig::default());
///
/// // h keeps its interior edges, k and l fall back to the data extents
/// assert_eq!(cache.axis(FullAxis::H).unwrap().edges, Some(vec![-0.5, 0.0, 0.5]));
/// assert!(cache.axis(FullAxis::K).unwrap().is_integrated());
/// assert_eq!(cache.axis(FullAxis::L).unwrap().maximum, 4.0);
/// assert!(cache.axis(FullAxis::DeltaE).is_none());
///
/// // every energy edge becomes a final wavevector
/// assert_eq!(cache.kf_edges().map(|e| e.len()), Some(6));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionCache {
    reciprocal: [AxisCache; 3],
    kf_edges: Option<Vec<f64>>,
    beam: IncidentBeam,
}

impl DimensionCache {
    /// Build the cache for one run
    pub fn new(
        grid: &GridDefinition,
        extents: &DataExtents,
        beam: IncidentBeam,
        config: &NormalizationConfig,
    ) -> Self {
        let factor = config.degeneracy_factor;
        let reciprocal = FullAxis::RECIPROCAL.map(|axis| AxisCache::new(grid, extents, axis, factor));

        let kf_edges = grid
            .output_axis(FullAxis::DeltaE)
            .filter(|axis| !axis.is_single_bin())
            .map(|axis| axis.edges().iter().map(|e| beam.kf(*e)).collect());

        Self {
            reciprocal,
            kf_edges,
            beam,
        }
    }

    /// Cache for one of the reciprocal axes
    ///
    /// There is nothing for the energy transfer axis, its bounds are held by
    /// the [IncidentBeam] as final wavevectors.
    pub fn axis(&self, axis: FullAxis) -> Option<&AxisCache> {
        self.reciprocal.get(axis.index())
    }

    /// All three reciprocal axes in (h, k, l) order
    pub fn reciprocal(&self) -> &[AxisCache; 3] {
        &self.reciprocal
    }

    /// Energy transfer bin edges as final wavevectors, if not integrated
    pub fn kf_edges(&self) -> Option<&[f64]> {
        self.kf_edges.as_deref()
    }

    /// Incident beam state of the run
    pub fn beam(&self) -> &IncidentBeam {
        &self.beam
    }

    /// Check if an (h, k, l) point is inside every reciprocal bound
    #[inline]
    pub fn contains(&self, hkl: &[f64; 3], tol: f64) -> bool {
        self.reciprocal
            .iter()
            .zip(hkl)
            .all(|(axis, value)| axis.contains(*value, tol))
    }
}
