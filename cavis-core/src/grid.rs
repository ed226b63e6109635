//! Validated cell grids.
//!
//! A [`CellGrid`] is one immutable `n × n` snapshot of cell values as
//! received on the wire, checked for shape and palette range before
//! anything is rendered. Validation happens up front so a bad frame
//! can never leave a half-painted surface or a corrupted cache behind.

use crate::error::CavisError;

/// An `n × n` grid of 1-based palette indices, stored flat, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    n: usize,
    cells: Vec<u32>,
}

impl CellGrid {
    /// Validate raw wire rows against the run dimension and palette.
    pub fn from_rows(n: usize, rows: &[Vec<u32>], palette_len: usize) -> Result<Self, CavisError> {
        if n == 0 {
            return Err(CavisError::ZeroDimension);
        }
        if rows.len() != n {
            return Err(CavisError::GridRowCount {
                expected: n,
                actual: rows.len(),
            });
        }

        let mut cells = Vec::with_capacity(n * n);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(CavisError::GridDimension {
                    expected: n,
                    row: r,
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value == 0 || value as usize > palette_len {
                    return Err(CavisError::CellValue {
                        value,
                        row: r,
                        col: c,
                        palette_len,
                    });
                }
                cells.push(value);
            }
        }

        Ok(Self { n, cells })
    }

    /// Grid dimension (rows == columns).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Cell value at `(row, col)`. Callers index within `0..n`.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.n + col]
    }
}
