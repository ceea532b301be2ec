//! Core types for grid processing.

use forcing_common::Array2D;

use crate::error::{GridProcessorError, Result};

/// Fractional source-grid indices for every target point.
///
/// Both arrays share the target's shape. `i` addresses source columns and
/// `j` source rows; the integer part selects the lower-left corner and the
/// fractional part is the bilinear weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionalIndices {
    pub(crate) i: Array2D,
    pub(crate) j: Array2D,
}

impl FractionalIndices {
    pub fn new(i: Array2D, j: Array2D) -> Result<Self> {
        if i.shape() != j.shape() {
            return Err(GridProcessorError::shape_mismatch(
                "row index field",
                i.shape(),
                j.shape(),
            ));
        }
        Ok(Self { i, j })
    }

    pub fn i(&self) -> &Array2D {
        &self.i
    }

    pub fn j(&self) -> &Array2D {
        &self.j
    }

    /// Shape of the target the indices were computed for.
    pub fn shape(&self) -> (usize, usize) {
        self.i.shape()
    }

    /// `(i, j)` of target point `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> (f64, f64) {
        (self.i[(x, y)], self.j[(x, y)])
    }
}
