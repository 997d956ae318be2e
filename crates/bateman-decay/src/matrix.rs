//! Sparse lower-triangular matrix.
//!
//! Each row keeps only its stored, non-zero cells (`col <= row`) in a
//! column-ordered map. Reads of unset cells and of the strict upper triangle
//! return zero. Stored NaNs become zero.

use std::collections::BTreeMap;
use std::ops::Range;

use bateman_core::error::DecayError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangularMatrix {
    rows: Vec<BTreeMap<usize, f64>>,
}

impl TriangularMatrix {
    /// An all-zero `dim × dim` matrix.
    pub fn zeros(dim: usize) -> Self {
        Self {
            rows: vec![BTreeMap::new(); dim],
        }
    }

    /// The `dim × dim` identity.
    pub fn identity(dim: usize) -> Self {
        let rows = (0..dim).map(|i| BTreeMap::from([(i, 1.0)])).collect();
        Self { rows }
    }

    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    /// Value at `(row, col)`. Zero when unset, out of range or above the diagonal.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(&col))
            .copied()
            .unwrap_or(0.0)
    }

    /// Store `value` at `(row, col)`.
    ///
    /// NaN is stored as zero and zero clears the cell. Writing above the
    /// diagonal is an error.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), DecayError> {
        if col > row {
            return Err(DecayError::NotLowerTriangular { row, col });
        }
        let dim = self.dim();
        let cells = self.rows.get_mut(row).ok_or(DecayError::DimensionMismatch {
            expected: dim,
            got: row + 1,
        })?;
        let value = if value.is_nan() { 0.0 } else { value };
        if value == 0.0 {
            cells.remove(&col);
        } else {
            cells.insert(col, value);
        }
        Ok(())
    }

    /// Add `value` to the cell at `(row, col)`.
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> Result<(), DecayError> {
        let current = self.get(row, col);
        self.set(row, col, current + value)
    }

    /// The main diagonal.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.dim()).map(|i| self.get(i, i)).collect()
    }

    /// Stored cells of `row` in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows
            .get(row)
            .into_iter()
            .flat_map(|r| r.iter().map(|(&c, &v)| (c, v)))
    }

    /// Stored cells of `row` whose column lies in `cols`.
    pub fn row_range(&self, row: usize, cols: Range<usize>) -> impl Iterator<Item = (usize, f64)> + '_ {
        let cols = cols.start..cols.end.max(cols.start);
        self.rows
            .get(row)
            .into_iter()
            .flat_map(move |r| r.range(cols.clone()).map(|(&c, &v)| (c, v)))
    }

    /// Number of stored (non-zero) cells.
    pub fn stored(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    /// Matrix–vector product `self · v`.
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>, DecayError> {
        if v.len() != self.dim() {
            return Err(DecayError::DimensionMismatch {
                expected: self.dim(),
                got: v.len(),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|cells| cells.iter().map(|(&c, &a)| a * v[c]).sum())
            .collect())
    }

    /// Dense row-major copy, for diagnostics.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let n = self.dim();
        (0..n)
            .map(|i| (0..n).map(|j| self.get(i, j)).collect())
            .collect()
    }
}
