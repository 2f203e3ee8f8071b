//! Module for a single binned axis of the output grid

// internal modules
use crate::error::{Error, Result};

// fluxnorm modules
use fluxnorm_utils::{SliceExt, ValueExt};

// external crates
use serde::{Deserialize, Serialize};

/// A named axis defined by strictly increasing bin edges
///
/// Axes are almost always uniform, matching how the original data histogram is
/// binned, but arbitrary edges are supported for completeness. Either way the
/// edges are generated once on construction and never change.
///
/// ```rust
/// # use fluxnorm_grid::Axis;
/// let axis = Axis::uniform("h", -1.0, 1.0, 4).unwrap();
///
/// assert_eq!(axis.edges(), &[-1.0, -0.5, 0.0, 0.5, 1.0]);
/// assert_eq!(axis.n_bins(), 4);
/// assert_eq!(axis.minimum(), -1.0);
/// assert_eq!(axis.maximum(), 1.0);
/// ```
///
/// Serialised axes may be written either way:
///
/// ```json
/// { "name": "h", "minimum": -1.0, "maximum": 1.0, "n_bins": 4 }
/// { "name": "h", "edges": [-1.0, -0.5, 0.0, 0.5, 1.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisBins", into = "AxisBins")]
pub struct Axis {
    name: String,
    edges: Vec<f64>,
}

impl Axis {
    /// Uniform bins between `minimum` and `maximum`
    ///
    /// The last edge is set to `maximum` exactly rather than accumulated, so
    /// the upper bound is never lost to rounding.
    pub fn uniform(name: impl Into<String>, minimum: f64, maximum: f64, n_bins: usize) -> Result<Self> {
        let name = name.into();

        if !(minimum.is_finite() && maximum.is_finite()) || minimum > maximum {
            return Err(Error::InvalidBounds {
                name,
                minimum,
                maximum,
            });
        }

        if n_bins == 0 {
            return Err(Error::NoBins(name));
        }

        let width = (maximum - minimum) / n_bins as f64;
        let mut edges = (0..n_bins)
            .map(|i| minimum + i as f64 * width)
            .collect::<Vec<f64>>();
        edges.push(maximum);

        Self::from_edges(name, edges)
    }

    /// Arbitrary bin edges, which must be finite and strictly increasing
    ///
    /// ```rust
    /// # use fluxnorm_grid::Axis;
    /// assert!(Axis::from_edges("dE", vec![-5.0, 0.0, 2.0, 15.0]).is_ok());
    /// assert!(Axis::from_edges("dE", vec![-5.0, 2.0, 0.0]).is_err());
    /// assert!(Axis::from_edges("dE", vec![-5.0]).is_err());
    /// ```
    pub fn from_edges(name: impl Into<String>, edges: Vec<f64>) -> Result<Self> {
        let name = name.into();

        if edges.len() < 2 {
            return Err(Error::NoBins(name));
        }

        if !edges.is_strictly_increasing() {
            return Err(Error::NonIncreasingEdges(name));
        }

        Ok(Self { name, edges })
    }

    /// Axis name, e.g. 'h', 'DeltaE', 'temperature'
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All bin edges, including both bounds
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lowest bin edge
    pub fn minimum(&self) -> f64 {
        self.edges[0]
    }

    /// Highest bin edge
    pub fn maximum(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Number of bins, always at least one
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Width of the narrowest bin
    ///
    /// Used to scale numerical tolerances to the grid rather than relying on a
    /// fixed epsilon.
    pub fn min_bin_width(&self) -> f64 {
        self.edges
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min)
    }

    /// Find the bin containing a value, `None` if outside of the axis
    ///
    /// Bins are `low <= value < high`, except the last which also includes its
    /// upper edge.
    ///
    /// ```rust
    /// # use fluxnorm_grid::Axis;
    /// let axis = Axis::uniform("k", 0.0, 3.0, 3).unwrap();
    /// assert_eq!(axis.bin_index(0.0), Some(0));
    /// assert_eq!(axis.bin_index(1.0), Some(1));
    /// assert_eq!(axis.bin_index(3.0), Some(2));
    /// assert_eq!(axis.bin_index(3.1), None);
    /// ```
    #[inline]
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        self.edges.find_bin(value).ok()
    }

    /// Check if the axis is a single bin
    ///
    /// Single bin axes have no interior edges, and are treated as integrated.
    pub fn is_single_bin(&self) -> bool {
        self.n_bins() == 1
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, {}] x{}",
            self.name,
            self.minimum().sci(4, 2),
            self.maximum().sci(4, 2),
            self.n_bins()
        )
    }
}

/// Serialised representation of an [Axis]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AxisBins {
    Uniform {
        name: String,
        minimum: f64,
        maximum: f64,
        n_bins: usize,
    },
    Edges {
        name: String,
        edges: Vec<f64>,
    },
}

impl TryFrom<AxisBins> for Axis {
    type Error = Error;

    fn try_from(bins: AxisBins) -> Result<Self> {
        match bins {
            AxisBins::Uniform {
                name,
                minimum,
                maximum,
                n_bins,
            } => Axis::uniform(name, minimum, maximum, n_bins),
            AxisBins::Edges { name, edges } => Axis::from_edges(name, edges),
        }
    }
}

impl From<Axis> for AxisBins {
    fn from(axis: Axis) -> Self {
        AxisBins::Edges {
            name: axis.name,
            edges: axis.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_keeps_exact_maximum() {
        let axis = Axis::uniform("h", -1.0, 1.0, 10).unwrap();
        assert_eq!(axis.edges().len(), 11);
        assert_eq!(axis.maximum(), 1.0);
        assert!((axis.min_bin_width() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn uniform_rejects_bad_input() {
        assert_eq!(
            Axis::uniform("h", 1.0, -1.0, 2),
            Err(Error::InvalidBounds {
                name: "h".to_string(),
                minimum: 1.0,
                maximum: -1.0
            })
        );
        assert_eq!(Axis::uniform("h", -1.0, 1.0, 0), Err(Error::NoBins("h".into())));
        assert!(Axis::uniform("h", f64::NEG_INFINITY, 1.0, 2).is_err());
    }

    #[test]
    fn zero_width_axis_is_not_increasing() {
        assert_eq!(
            Axis::uniform("l", 0.5, 0.5, 1),
            Err(Error::NonIncreasingEdges("l".into()))
        );
    }

    #[test]
    fn deserialise_both_forms() {
        let uniform: Axis =
            serde_json::from_str(r#"{"name":"h","minimum":0.0,"maximum":2.0,"n_bins":2}"#).unwrap();
        let edges: Axis = serde_json::from_str(r#"{"name":"h","edges":[0.0,1.0,2.0]}"#).unwrap();
        assert_eq!(uniform, edges);

        let bad = serde_json::from_str::<Axis>(r#"{"name":"h","edges":[0.0,2.0,1.0]}"#);
        assert!(bad.is_err());
    }
}
