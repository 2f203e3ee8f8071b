//! Module for the shared, add-only normalization histogram

// internal modules
use crate::error::{Error, Result};

// external crates
use std::sync::atomic::{AtomicU64, Ordering};

/// Dense signal storage shared between every detector computation
///
/// Each cell holds the bit pattern of an `f64` in an [AtomicU64], and
/// [add()](AccumulationGrid::add) is a compare-and-swap loop around a single
/// floating point add. Any number of threads may add to the same cell through
/// a shared reference without losing updates.
///
/// Cells only ever increase. Negative and non-finite contributions are
/// rejected rather than added.
///
/// ```rust
/// # use fluxnorm_grid::AccumulationGrid;
/// let grid = AccumulationGrid::zeros(4);
/// grid.add(1, 0.5).unwrap();
/// grid.add(1, 0.25).unwrap();
///
/// assert_eq!(grid.to_vec(), vec![0.0, 0.75, 0.0, 0.0]);
/// assert!(grid.add(4, 1.0).is_err());
/// assert!(grid.add(0, -1.0).is_err());
/// ```
pub struct AccumulationGrid {
    cells: Vec<AtomicU64>,
}

impl AccumulationGrid {
    /// New grid of `n` cells, all zero
    pub fn zeros(n: usize) -> Self {
        let zero = 0.0_f64.to_bits();
        Self {
            cells: (0..n).map(|_| AtomicU64::new(zero)).collect(),
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid has no cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Atomically add a contribution to a cell
    pub fn add(&self, index: usize, value: f64) -> Result<()> {
        if !(value.is_finite() && value >= 0.0) {
            return Err(Error::InvalidContribution(value));
        }

        let cell = self.cells.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.cells.len(),
        })?;

        // the closure always returns Some, so this can never be Err
        let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            Some((f64::from_bits(bits) + value).to_bits())
        });

        Ok(())
    }

    /// Current value of a cell
    pub fn get(&self, index: usize) -> Option<f64> {
        self.cells
            .get(index)
            .map(|c| f64::from_bits(c.load(Ordering::Acquire)))
    }

    /// Sum over every cell
    pub fn total(&self) -> f64 {
        self.cells
            .iter()
            .map(|c| f64::from_bits(c.load(Ordering::Acquire)))
            .sum()
    }

    /// Snapshot of every cell value
    pub fn to_vec(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|c| f64::from_bits(c.load(Ordering::Acquire)))
            .collect()
    }

    /// Take the cell values, consuming the grid
    pub fn into_vec(self) -> Vec<f64> {
        self.cells
            .into_iter()
            .map(|c| f64::from_bits(c.into_inner()))
            .collect()
    }
}

impl std::fmt::Debug for AccumulationGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulationGrid")
            .field("len", &self.len())
            .field("total", &self.total())
            .finish()
    }
}
