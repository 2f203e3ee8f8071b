//! Module for mapping full-space coordinates onto the output grid

// internal modules
use crate::definition::{AxisSource, FullAxis, GridDefinition};
use crate::error::{Error, Result};

// external crates
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Homogeneous 0/1 selector from the full space into the output grid
///
/// The matrix has one row per output axis plus a homogeneous row, and one
/// column per full-space axis `(h, k, l, ΔE, extra...)` plus a homogeneous
/// column. A `1` at `(row, col)` means output axis `row` takes its coordinate
/// from full-space axis `col`. Full-space columns with no `1` are integrated
/// out, and play no part in indexing.
///
/// For example, a grid over `(h, ΔE)` with no extra axes:
///
/// ```text
///            h  k  l  dE  1
///     h   [  1  0  0  0   0 ]
///     dE  [  0  0  0  1   0 ]
///     1   [  0  0  0  0   1 ]
/// ```
///
/// The selection is worked out once on construction, so
/// [linear_index()](AffineIndexMatrix::linear_index) never needs to touch the
/// matrix itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineIndexMatrix {
    matrix: DMatrix<f64>,
    /// Full-space column feeding each output row, if any
    selection: Vec<Option<usize>>,
    /// Homogeneous column for each output row
    offsets: Vec<f64>,
}

impl AffineIndexMatrix {
    /// Build the selector for a grid, given the extra axes of the full space
    ///
    /// Extra axis names are in full-space column order, i.e. the first name is
    /// column 4. Any output axis sourced from an extra axis that is not listed
    /// is an error.
    ///
    /// ```rust
    /// # use fluxnorm_grid::{AffineIndexMatrix, Axis, AxisSource, FullAxis, GridDefinition};
    /// let grid = GridDefinition::new(vec![
    ///     (Axis::uniform("T", 0.0, 300.0, 3).unwrap(), AxisSource::Extra("T".into())),
    ///     (Axis::uniform("k", -1.0, 1.0, 2).unwrap(), AxisSource::Full(FullAxis::K)),
    /// ])
    /// .unwrap();
    ///
    /// let affine = AffineIndexMatrix::from_definition(&grid, &["T"]).unwrap();
    /// assert_eq!(affine.shape(), (3, 6));
    /// assert_eq!(affine.source_column(0), Some(4));
    /// assert_eq!(affine.source_column(1), Some(1));
    /// assert_eq!(affine.output_row(FullAxis::H.index()), None);
    ///
    /// // unknown extra axes are rejected
    /// assert!(AffineIndexMatrix::from_definition(&grid, &[]).is_err());
    /// ```
    pub fn from_definition(grid: &GridDefinition, extra_names: &[&str]) -> Result<Self> {
        let n_out = grid.n_dims();
        let n_full = FullAxis::ALL.len() + extra_names.len();

        let mut matrix = DMatrix::<f64>::zeros(n_out + 1, n_full + 1);
        for (row, output) in grid.axes().iter().enumerate() {
            let col = match &output.source {
                AxisSource::Full(full) => full.index(),
                AxisSource::Extra(name) => extra_names
                    .iter()
                    .position(|n| *n == name.as_str())
                    .map(|i| FullAxis::ALL.len() + i)
                    .ok_or_else(|| Error::UnknownExtraAxis(name.clone()))?,
            };
            matrix[(row, col)] = 1.0;
        }
        matrix[(n_out, n_full)] = 1.0;

        debug!("Affine index matrix:{matrix}");
        Self::from_matrix(matrix, grid, extra_names.len())
    }

    /// Use an explicit homogeneous selector matrix
    ///
    /// Selection entries must be exactly 0 or 1, with at most one `1` per
    /// output row and per full-space column. The homogeneous column may carry
    /// any finite offset, and the homogeneous row must be `(0, ..., 0, 1)`.
    pub fn from_matrix(matrix: DMatrix<f64>, grid: &GridDefinition, n_extra: usize) -> Result<Self> {
        let n_out = grid.n_dims();
        let n_full = FullAxis::ALL.len() + n_extra;

        let expected = (n_out + 1, n_full + 1);
        if matrix.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: matrix.shape(),
            });
        }

        for row in 0..=n_out {
            for col in 0..=n_full {
                let value = matrix[(row, col)];
                let valid = match (row == n_out, col == n_full) {
                    (true, true) => value == 1.0,
                    (true, false) => value == 0.0,
                    (false, true) => value.is_finite(),
                    (false, false) => value == 0.0 || value == 1.0,
                };
                if !valid {
                    return Err(Error::InvalidSelectorEntry { row, col, value });
                }
            }
        }

        let mut selection = Vec::with_capacity(n_out);
        for row in 0..n_out {
            let mut selected = (0..n_full).filter(|&col| matrix[(row, col)] == 1.0);
            let first = selected.next();
            if selected.next().is_some() {
                return Err(Error::AmbiguousSelectorRow(row));
            }
            selection.push(first);
        }

        // a full-space axis feeding two output axes is just as ambiguous
        for (row, col) in selection.iter().enumerate() {
            if col.is_some() && selection[..row].contains(col) {
                return Err(Error::AmbiguousSelectorRow(row));
            }
        }

        let offsets = (0..n_out).map(|row| matrix[(row, n_full)]).collect();

        Ok(Self {
            matrix,
            selection,
            offsets,
        })
    }

    /// The underlying homogeneous matrix
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Matrix dimensions as `(n_out + 1, n_full + 1)`
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Number of full-space axes, excluding the homogeneous column
    pub fn n_full(&self) -> usize {
        self.matrix.ncols() - 1
    }

    /// Full-space column feeding an output row, if any
    pub fn source_column(&self, row: usize) -> Option<usize> {
        self.selection.get(row).copied().flatten()
    }

    /// Output row fed by a full-space column, `None` if it is integrated out
    pub fn output_row(&self, col: usize) -> Option<usize> {
        self.selection.iter().position(|s| *s == Some(col))
    }

    /// Check if a full-space column is integrated out of the output grid
    pub fn is_integrated(&self, col: usize) -> bool {
        self.output_row(col).is_none()
    }

    /// Apply the full homogeneous transform to a full-space point
    ///
    /// Returns the point in output-grid coordinates, or an error if the point
    /// does not have one value per full-space axis.
    pub fn transform(&self, point: &[f64]) -> Result<Vec<f64>> {
        let n_full = self.n_full();
        if point.len() != n_full {
            return Err(Error::ShapeMismatch {
                expected: (n_full, 1),
                found: (point.len(), 1),
            });
        }

        let homogeneous = DVector::from_iterator(
            n_full + 1,
            point.iter().copied().chain(std::iter::once(1.0)),
        );
        let projected = &self.matrix * homogeneous;
        Ok(projected.iter().take(self.selection.len()).copied().collect())
    }

    /// Linear index of the output cell containing a full-space point
    ///
    /// Points outside of the output grid along any axis return `None`, which
    /// is an expected outcome that just means there is nothing to add. A point
    /// with too few values is treated the same way.
    #[inline]
    pub fn linear_index(&self, grid: &GridDefinition, point: &[f64]) -> Option<usize> {
        let mut index = 0;
        let mut stride = 1;
        for ((output, column), offset) in grid.axes().iter().zip(&self.selection).zip(&self.offsets) {
            let value = match column {
                Some(col) => point.get(*col)? + offset,
                None => *offset,
            };
            index += output.axis.bin_index(value)? * stride;
            stride *= output.axis.n_bins();
        }
        Some(index)
    }
}
