use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Check that every value is finite and larger than the one before it
    ///
    /// Bin edges have to satisfy this for any of the bin searches to make
    /// sense. Slices with fewer than two values are trivially increasing.
    ///
    /// ```rust
    /// # use fluxnorm_utils::SliceExt;
    /// assert!([0.0_f64, 0.1, 1.0].is_strictly_increasing());
    /// assert!(![0.0_f64, 0.1, 0.1].is_strictly_increasing());
    /// assert!(![0.0_f64, f64::NAN].is_strictly_increasing());
    /// ```
    fn is_strictly_increasing(&self) -> bool;

    /// Find index bin containing 'value', where bins are low <= value < high
    ///
    /// A value on a bin edge returns the bin above. Values equal to the highest
    /// bound are considered part of the last bin, so that the closed interval
    /// `[first, last]` is covered completely.
    ///
    /// ```text
    ///     edges : -1.0 -0.5 0.0 0.5 1.0
    ///
    ///     -1.0 <= bin 0 < -0.5
    ///     -0.5 <= bin 1 <  0.0
    ///      0.0 <= bin 2 <  0.5
    ///      0.5 <= bin 3 <= 1.0
    /// ```
    ///
    /// ```rust
    /// # use fluxnorm_utils::SliceExt;
    /// let edges = vec![-1.0_f64, -0.5, 0.0, 0.5, 1.0];
    ///
    /// assert_eq!(edges.find_bin(-1.0), Ok(0));
    /// assert_eq!(edges.find_bin( 0.0), Ok(2));
    /// assert_eq!(edges.find_bin( 0.7), Ok(3));
    /// assert_eq!(edges.find_bin( 1.0), Ok(3));
    ///
    /// // Values outside the bin bounds are an error case
    /// assert!(edges.find_bin(-1.1).is_err());
    /// assert!(edges.find_bin( 1.1).is_err());
    /// ```
    ///
    /// Edges are assumed to be sorted, which allows for a binary search. This
    /// is called for every segment of every detector so it matters.
    fn find_bin(&self, value: T) -> Result<usize>;
}

impl SliceExt<f64> for [f64] {
    fn is_strictly_increasing(&self) -> bool {
        self.iter().all(|v| v.is_finite()) && self.windows(2).all(|w| w[0] < w[1])
    }

    fn find_bin(&self, value: f64) -> Result<usize> {
        // make sure there are bin edges to check against
        let n = self.len();
        if n < 2 {
            return Err(Error::TooFewEdges { found: n });
        }

        let first = self[0];
        let last = self[n - 1];

        // NAN fails both comparisons, so check it the other way around
        if !(value >= first && value <= last) {
            return Err(Error::OutsideEdges { value, first, last });
        }

        // special case for being on the upper edge
        if value == last {
            return Ok(n - 2);
        }

        // first edge strictly above the value closes the bin
        Ok(self.partition_point(|edge| *edge <= value) - 1)
    }
}
