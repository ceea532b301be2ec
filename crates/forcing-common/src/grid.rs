//! Dense 2-D arrays, the node-centred target mesh and its element grid.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{ForcingError, ForcingResult};

/// Dense row-major 2-D array of `f64`.
///
/// Source fields are stored as `(j, i)` (row = latitude-like axis), mesh
/// and element arrays as `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array2D {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Array2D {
    /// Wrap row-major data, checking that it fills `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> ForcingResult<Self> {
        if data.len() != rows * cols {
            return Err(ForcingError::InvalidShape(format!(
                "{} values cannot fill a {}x{} array",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Array with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Build an array by evaluating `f(row, col)` in row-major order.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked element access.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    /// Apply `f` to every element.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// Combine two arrays of the same shape element by element.
    pub fn zip_map<F>(&self, other: &Array2D, mut f: F) -> ForcingResult<Self>
    where
        F: FnMut(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(ForcingError::shape_mismatch(
                "zip_map operand",
                self.shape(),
                other.shape(),
            ));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Values of column `col` from `start_row` to the last row.
    pub fn column_from(&self, col: usize, start_row: usize) -> Vec<f64> {
        (start_row..self.rows)
            .map(|row| self.data[row * self.cols + col])
            .collect()
    }
}

impl Index<(usize, usize)> for Array2D {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Array2D {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}

/// Node-centred quadrilateral mesh, shape `(nx + 1, ny + 1)`, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMesh {
    lon: Array2D,
    lat: Array2D,
}

impl TargetMesh {
    pub fn new(lon: Array2D, lat: Array2D) -> ForcingResult<Self> {
        if lon.shape() != lat.shape() {
            return Err(ForcingError::shape_mismatch(
                "node latitude",
                lon.shape(),
                lat.shape(),
            ));
        }
        if lon.rows() < 2 || lon.cols() < 2 {
            return Err(ForcingError::InvalidMesh(format!(
                "need at least 2x2 nodes to form an element, got {}x{}",
                lon.rows(),
                lon.cols()
            )));
        }
        Ok(Self { lon, lat })
    }

    pub fn node_lon(&self) -> &Array2D {
        &self.lon
    }

    pub fn node_lat(&self) -> &Array2D {
        &self.lat
    }

    /// Number of elements along x.
    pub fn nx(&self) -> usize {
        self.lon.rows() - 1
    }

    /// Number of elements along y.
    pub fn ny(&self) -> usize {
        self.lon.cols() - 1
    }

    pub fn element_shape(&self) -> (usize, usize) {
        (self.nx(), self.ny())
    }
}

/// Element-centred longitude/latitude, shape `(nx, ny)`, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementGrid {
    lon: Array2D,
    lat: Array2D,
}

impl ElementGrid {
    pub fn new(lon: Array2D, lat: Array2D) -> ForcingResult<Self> {
        if lon.shape() != lat.shape() {
            return Err(ForcingError::shape_mismatch(
                "element latitude",
                lon.shape(),
                lat.shape(),
            ));
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> &Array2D {
        &self.lon
    }

    pub fn lat(&self) -> &Array2D {
        &self.lat
    }

    pub fn shape(&self) -> (usize, usize) {
        self.lon.shape()
    }

    pub fn nx(&self) -> usize {
        self.lon.rows()
    }

    pub fn ny(&self) -> usize {
        self.lon.cols()
    }
}
