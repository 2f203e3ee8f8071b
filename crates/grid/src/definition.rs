//! Module for the output grid layout and the extents of the original data

// internal modules
use crate::axis::Axis;
use crate::error::{Error, Result};

// external crates
use serde::{Deserialize, Serialize};

/// The four primary axes of the full space
///
/// The order here is the column order of the full-space coordinate, i.e.
/// `(h, k, l, ΔE, extra...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullAxis {
    /// Reciprocal lattice coordinate along a*
    H,
    /// Reciprocal lattice coordinate along b*
    K,
    /// Reciprocal lattice coordinate along c*
    L,
    /// Energy transfer, Ei - Ef (meV)
    DeltaE,
}

impl FullAxis {
    /// Every primary axis in full-space column order
    pub const ALL: [FullAxis; 4] = [FullAxis::H, FullAxis::K, FullAxis::L, FullAxis::DeltaE];

    /// Reciprocal axes only, in column order
    pub const RECIPROCAL: [FullAxis; 3] = [FullAxis::H, FullAxis::K, FullAxis::L];

    /// Column of this axis in the full-space coordinate
    pub const fn index(&self) -> usize {
        match self {
            FullAxis::H => 0,
            FullAxis::K => 1,
            FullAxis::L => 2,
            FullAxis::DeltaE => 3,
        }
    }

    /// Short name i.e. 'h', 'k', 'l', 'dE'
    pub fn short_name(&self) -> &str {
        match self {
            FullAxis::H => "h",
            FullAxis::K => "k",
            FullAxis::L => "l",
            FullAxis::DeltaE => "dE",
        }
    }
}

impl std::fmt::Display for FullAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Where the coordinate of an output axis comes from
///
/// Either one of the four primary axes, or an extra axis populated from a
/// per-run logged value (e.g. sample temperature) referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSource {
    /// One of (h, k, l, ΔE)
    Full(FullAxis),
    /// A declared extra axis, by name
    Extra(String),
}

impl std::fmt::Display for AxisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AxisSource::Full(axis) => write!(f, "{axis}"),
            AxisSource::Extra(name) => write!(f, "{name}"),
        }
    }
}

/// An [Axis] of the output grid and the full-space axis it corresponds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputAxis {
    /// Binning along this axis
    pub axis: Axis,
    /// Full-space axis feeding the coordinate
    pub source: AxisSource,
}

impl OutputAxis {
    /// Pair an axis with its source
    pub fn new(axis: Axis, source: AxisSource) -> Self {
        Self { axis, source }
    }
}

impl From<(Axis, AxisSource)> for OutputAxis {
    fn from((axis, source): (Axis, AxisSource)) -> Self {
        Self::new(axis, source)
    }
}

/// Layout of the output normalization grid
///
/// This is the material the data binning step hands over: the ordered axes of
/// the output histogram and which full-space axis each one follows. Any of the
/// primary axes without an output axis is integrated out.
///
/// Cells are stored with the first axis varying fastest, so for axes of size
/// `(n0, n1, n2)` the cell at bins `(i0, i1, i2)` has linear index
/// `i0 + n0 * (i1 + n1 * i2)`.
///
/// ```rust
/// # use fluxnorm_grid::{Axis, AxisSource, FullAxis, GridDefinition};
/// let grid = GridDefinition::new(vec![
///     (Axis::uniform("h", -1.0, 1.0, 10).unwrap(), AxisSource::Full(FullAxis::H)),
///     (Axis::uniform("k", -1.0, 1.0, 5).unwrap(), AxisSource::Full(FullAxis::K)),
/// ])
/// .unwrap();
///
/// assert_eq!(grid.n_dims(), 2);
/// assert_eq!(grid.n_cells(), 50);
/// assert_eq!(grid.shape(), vec![10, 5]);
/// assert!(grid.output_axis(FullAxis::L).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OutputAxis>", into = "Vec<OutputAxis>")]
pub struct GridDefinition {
    axes: Vec<OutputAxis>,
}

impl GridDefinition {
    /// Build a grid from an ordered list of output axes
    ///
    /// Fails if there are no axes, or if two axes share the same source.
    pub fn new<A: Into<OutputAxis>>(axes: impl IntoIterator<Item = A>) -> Result<Self> {
        let axes = axes.into_iter().map(Into::into).collect::<Vec<OutputAxis>>();

        if axes.is_empty() {
            return Err(Error::EmptyGrid);
        }

        for (i, a) in axes.iter().enumerate() {
            if axes[..i].iter().any(|b| b.source == a.source) {
                return Err(Error::DuplicateSource(a.source.to_string()));
            }
        }

        Ok(Self { axes })
    }

    /// All output axes in storage order
    pub fn axes(&self) -> &[OutputAxis] {
        &self.axes
    }

    /// Number of output dimensions
    pub fn n_dims(&self) -> usize {
        self.axes.len()
    }

    /// Number of bins along each output axis
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.axis.n_bins()).collect()
    }

    /// Total number of cells in the dense grid
    pub fn n_cells(&self) -> usize {
        self.axes.iter().map(|a| a.axis.n_bins()).product()
    }

    /// Output axis following one of the primary axes, if there is one
    pub fn output_axis(&self, full: FullAxis) -> Option<&Axis> {
        self.find(|source| *source == AxisSource::Full(full))
    }

    /// Output axis following a named extra axis, if there is one
    pub fn extra_axis(&self, name: &str) -> Option<&Axis> {
        self.find(|source| matches!(source, AxisSource::Extra(n) if n == name))
    }

    fn find(&self, predicate: impl Fn(&AxisSource) -> bool) -> Option<&Axis> {
        self.axes.iter().find(|a| predicate(&a.source)).map(|a| &a.axis)
    }

    /// Output row of the axis with the given source
    pub fn position(&self, source: &AxisSource) -> Option<usize> {
        self.axes.iter().position(|a| &a.source == source)
    }

    /// Linear index of a point already expressed in output-grid coordinates
    ///
    /// Returns `None` if the point is outside the grid along any axis, which is
    /// a normal outcome rather than an error.
    ///
    /// ```rust
    /// # use fluxnorm_grid::{Axis, AxisSource, FullAxis, GridDefinition};
    /// let grid = GridDefinition::new(vec![
    ///     (Axis::uniform("h", 0.0, 4.0, 4).unwrap(), AxisSource::Full(FullAxis::H)),
    ///     (Axis::uniform("k", 0.0, 3.0, 3).unwrap(), AxisSource::Full(FullAxis::K)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(grid.linear_index(&[0.5, 0.5]), Some(0));
    /// assert_eq!(grid.linear_index(&[1.5, 0.5]), Some(1));
    /// assert_eq!(grid.linear_index(&[1.5, 2.5]), Some(9));
    /// assert_eq!(grid.linear_index(&[4.5, 0.5]), None);
    /// ```
    pub fn linear_index(&self, coordinates: &[f64]) -> Option<usize> {
        if coordinates.len() != self.axes.len() {
            return None;
        }

        let mut index = 0;
        let mut stride = 1;
        for (output, value) in self.axes.iter().zip(coordinates) {
            index += output.axis.bin_index(*value)? * stride;
            stride *= output.axis.n_bins();
        }
        Some(index)
    }

    /// Bin indices along every axis for a linear index
    ///
    /// The reverse of [linear_index()](GridDefinition::linear_index).
    pub fn bin_indices(&self, index: usize) -> Option<Vec<usize>> {
        if index >= self.n_cells() {
            return None;
        }

        let mut remainder = index;
        Some(
            self.axes
                .iter()
                .map(|a| {
                    let n = a.axis.n_bins();
                    let i = remainder % n;
                    remainder /= n;
                    i
                })
                .collect(),
        )
    }
}

impl TryFrom<Vec<OutputAxis>> for GridDefinition {
    type Error = Error;

    fn try_from(axes: Vec<OutputAxis>) -> Result<Self> {
        GridDefinition::new(axes)
    }
}

impl From<GridDefinition> for Vec<OutputAxis> {
    fn from(grid: GridDefinition) -> Self {
        grid.axes
    }
}

/// Closed interval `[minimum, maximum]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Lower bound
    pub minimum: f64,
    /// Upper bound
    pub maximum: f64,
}

impl Extent {
    /// New extent, not checked until used
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.maximum - self.minimum
    }

    /// Overlap with another extent, which may be empty (min > max)
    pub fn intersect(&self, other: &Extent) -> Extent {
        Extent {
            minimum: self.minimum.max(other.minimum),
            maximum: self.maximum.min(other.maximum),
        }
    }

    /// Check if a value is inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }

    /// Finite bounds with minimum no larger than maximum
    pub fn is_valid(&self) -> bool {
        self.minimum.is_finite() && self.maximum.is_finite() && self.minimum <= self.maximum
    }
}

impl From<&Axis> for Extent {
    fn from(axis: &Axis) -> Self {
        Extent::new(axis.minimum(), axis.maximum())
    }
}

/// An additional axis of the original data, filled from a logged value
///
/// The extent is where the original data has events, so a run logged outside
/// of it never contributed anything to that part of the histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraAxis {
    /// Name of both the axis and the run log providing its value
    pub name: String,
    /// Extent of the axis in the original data
    pub extent: Extent,
}

/// Extents of the original (unnormalized) data in the full space
///
/// The energy transfer extent defines the final momentum range of every
/// trajectory, and primary axes integrated out of the output grid are bounded
/// by these extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataExtents {
    /// Extent of h
    pub h: Extent,
    /// Extent of k
    pub k: Extent,
    /// Extent of l
    pub l: Extent,
    /// Extent of the energy transfer (meV)
    pub delta_e: Extent,
    /// Any additional logged axes, in full-space column order after ΔE
    #[serde(default)]
    pub extra: Vec<ExtraAxis>,
}

impl DataExtents {
    /// Extents of the four primary axes with no extra axes
    pub fn new(h: Extent, k: Extent, l: Extent, delta_e: Extent) -> Self {
        Self {
            h,
            k,
            l,
            delta_e,
            extra: Vec::new(),
        }
    }

    /// Add an extra logged axis
    pub fn with_extra(mut self, name: impl Into<String>, extent: Extent) -> Self {
        self.extra.push(ExtraAxis {
            name: name.into(),
            extent,
        });
        self
    }

    /// Extent of one of the primary axes
    pub fn get(&self, axis: FullAxis) -> Extent {
        match axis {
            FullAxis::H => self.h,
            FullAxis::K => self.k,
            FullAxis::L => self.l,
            FullAxis::DeltaE => self.delta_e,
        }
    }

    /// Names of the extra axes in column order
    pub fn extra_names(&self) -> Vec<&str> {
        self.extra.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of columns in the full-space coordinate, excluding homogeneous
    pub fn n_full_dims(&self) -> usize {
        FullAxis::ALL.len() + self.extra.len()
    }
}
