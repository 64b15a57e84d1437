use rand::prelude::*;
use std::ops::{Add, AddAssign, Mul};
use thiserror::Error;

use crate::activation::sigmoid;

/// Errors raised when building a matrix from caller-supplied row data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("cannot build a matrix from zero rows")]
    Empty,
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// An owned, dense, row-major 2D buffer of `f64`.
///
/// Invariant: `data.len() == rows * cols` at all times. The backing buffer is
/// never shared; cloning deep-copies it, and a moved-from (`std::mem::take`n)
/// matrix is left as the valid empty `0×0` matrix.
#[derive(Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a `rows × cols` matrix with every element zero.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a `rows × cols` matrix with elements drawn uniformly from `[0, 1)`.
    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);
        for value in res.data.iter_mut() {
            *value = rng.gen::<f64>();
        }
        res
    }

    /// Builds a matrix from a rectangular literal: every row must have the
    /// same length as the first one.
    pub fn from_rows(rows_of_values: Vec<Vec<f64>>) -> Result<Matrix, MatrixError> {
        let first = rows_of_values.first().ok_or(MatrixError::Empty)?;
        let cols = first.len();
        if cols == 0 {
            return Err(MatrixError::Empty);
        }
        for (row, values) in rows_of_values.iter().enumerate() {
            if values.len() != cols {
                return Err(MatrixError::RaggedRow {
                    row,
                    expected: cols,
                    actual: values.len(),
                });
            }
        }

        let rows = rows_of_values.len();
        let mut data = Vec::with_capacity(rows * cols);
        for values in &rows_of_values {
            data.extend_from_slice(values);
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Borrows row `r` as a contiguous slice.
    ///
    /// # Panics
    /// Panics if `r >= rows`.
    pub fn row(&self, r: usize) -> &[f64] {
        assert!(r < self.rows, "row index {r} out of bounds for {} rows", self.rows);
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Bounds-checked element read.
    ///
    /// # Panics
    /// Panics if `row >= rows` or `col >= cols` — out-of-range access is a
    /// programmer error, not a recoverable condition.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    /// Bounds-checked mutable element access.
    ///
    /// # Panics
    /// Panics if `row >= rows` or `col >= cols`.
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        let index = self.index(row, col);
        &mut self.data[index]
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for a {}x{} matrix",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    /// Copies a rectangular region into a new owned matrix, row by row.
    ///
    /// # Panics
    /// Panics unless `row_offset + sub_rows <= rows` and
    /// `col_offset + sub_cols <= cols`.
    pub fn sub_matrix(
        &self,
        row_offset: usize,
        col_offset: usize,
        sub_rows: usize,
        sub_cols: usize,
    ) -> Matrix {
        assert!(
            row_offset + sub_rows <= self.rows && col_offset + sub_cols <= self.cols,
            "sub-matrix {sub_rows}x{sub_cols} at ({row_offset}, {col_offset}) \
             exceeds a {}x{} matrix",
            self.rows,
            self.cols
        );

        let mut result = Matrix::zeros(sub_rows, sub_cols);
        for row in 0..sub_rows {
            let src = (row_offset + row) * self.cols + col_offset;
            let dst = row * sub_cols;
            result.data[dst..dst + sub_cols].copy_from_slice(&self.data[src..src + sub_cols]);
        }
        result
    }

    /// Matrix product `self · rhs` written into `out`.
    ///
    /// `out` is zeroed first, then accumulated with the shared index in the
    /// middle loop and the `rhs` column innermost, so the inner loop walks
    /// contiguous memory in both `rhs` and `out`.
    ///
    /// # Panics
    /// Panics unless `self.cols == rhs.rows`, `out.rows == self.rows` and
    /// `out.cols == rhs.cols`.
    pub fn dot(&self, rhs: &Matrix, out: &mut Matrix) {
        assert!(
            self.cols == rhs.rows,
            "dot: lhs is {}x{} but rhs is {}x{}",
            self.rows,
            self.cols,
            rhs.rows,
            rhs.cols
        );
        assert!(
            out.rows == self.rows && out.cols == rhs.cols,
            "dot: result should be {}x{}, got {}x{}",
            self.rows,
            rhs.cols,
            out.rows,
            out.cols
        );

        out.fill(0.0);
        for i in 0..self.rows {
            let lhs_row = i * self.cols;
            let out_row = i * out.cols;
            for k in 0..self.cols {
                let a = self.data[lhs_row + k];
                let rhs_row = k * rhs.cols;
                for j in 0..rhs.cols {
                    out.data[out_row + j] += a * rhs.data[rhs_row + j];
                }
            }
        }
    }

    /// Elementwise `self + rhs` written into `out`.
    ///
    /// # Panics
    /// Panics unless all three matrices share the same shape.
    pub fn sum(&self, rhs: &Matrix, out: &mut Matrix) {
        self.assert_same_shape(rhs, "sum");
        self.assert_same_shape(out, "sum result");
        for (index, value) in out.data.iter_mut().enumerate() {
            *value = self.data[index] + rhs.data[index];
        }
    }

    /// Elementwise `self += rhs`.
    ///
    /// # Panics
    /// Panics unless both matrices share the same shape.
    pub fn add_assign_from(&mut self, rhs: &Matrix) {
        self.assert_same_shape(rhs, "add");
        for (value, &r) in self.data.iter_mut().zip(rhs.data.iter()) {
            *value += r;
        }
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for value in self.data.iter_mut() {
            *value *= factor;
        }
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Applies the sigmoid function to every element in place.
    pub fn activate(&mut self) {
        for value in self.data.iter_mut() {
            *value = sigmoid(*value);
        }
    }

    fn assert_same_shape(&self, other: &Matrix, what: &str) {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "{what}: expected a {}x{} matrix, got {}x{}",
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
    }
}

impl Clone for Matrix {
    fn clone(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.clone(),
        }
    }

    /// Reuses the destination buffer when the shapes already match.
    fn clone_from(&mut self, source: &Matrix) {
        if self.rows == source.rows && self.cols == source.cols {
            self.data.copy_from_slice(&source.data);
        } else {
            *self = source.clone();
        }
    }
}

/// The empty `0×0` matrix; what a moved-from matrix is left as.
impl Default for Matrix {
    fn default() -> Self {
        Matrix {
            rows: 0,
            cols: 0,
            data: vec![],
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        self.dot(rhs, &mut out);
        out
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        let mut out = Matrix::zeros(self.rows, self.cols);
        self.sum(rhs, &mut out);
        out
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        self.add_assign_from(rhs);
    }
}
