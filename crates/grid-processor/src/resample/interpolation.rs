//! Bilinear interpolation at fractional source indices.
//!
//! Corners are taken at `floor(i)`, `floor(j)` and one past each. Callers
//! must keep `floor(i) + 1` and `floor(j) + 1` inside the source array; no
//! clamping is performed.

use forcing_common::Array2D;

use crate::types::FractionalIndices;

/// The four corner weights of a bilinear stencil.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearWeights {
    /// Lower-left column
    pub i0: usize,
    /// Lower-left row
    pub j0: usize,
    /// Weights of `(j0, i0)`, `(j0, i0+1)`, `(j0+1, i0)`, `(j0+1, i0+1)`
    pub weights: [f64; 4],
}

impl BilinearWeights {
    /// `((row, col), weight)` for each corner, in the order of `weights`.
    pub fn corners(&self) -> [((usize, usize), f64); 4] {
        let (i0, j0) = (self.i0, self.j0);
        [
            ((j0, i0), self.weights[0]),
            ((j0, i0 + 1), self.weights[1]),
            ((j0 + 1, i0), self.weights[2]),
            ((j0 + 1, i0 + 1), self.weights[3]),
        ]
    }
}

/// Stencil corner and weights at fractional index `(i, j)`.
pub fn bilinear_weights(i: f64, j: f64) -> BilinearWeights {
    let fi0 = i.floor();
    let fj0 = j.floor();
    let fi = i - fi0;
    let fj = j - fj0;

    BilinearWeights {
        i0: fi0 as usize,
        j0: fj0 as usize,
        weights: [
            (1.0 - fj) * (1.0 - fi),
            (1.0 - fj) * fi,
            fj * (1.0 - fi),
            fj * fi,
        ],
    }
}

#[inline]
fn debug_check_stencil(data: &Array2D, i: f64, j: f64, stencil: &BilinearWeights) {
    debug_assert!(
        i >= 0.0 && j >= 0.0 && stencil.i0 + 1 < data.cols() && stencil.j0 + 1 < data.rows(),
        "bilinear stencil at ({}, {}) outside source of shape {:?}",
        i,
        j,
        data.shape()
    );
}

/// Plain bilinear interpolation of `data` at `(i, j)`.
pub fn bilinear(data: &Array2D, i: f64, j: f64) -> f64 {
    let stencil = bilinear_weights(i, j);
    debug_check_stencil(data, i, j, &stencil);

    stencil
        .corners()
        .iter()
        .map(|&(cell, weight)| weight * data[cell])
        .sum()
}

/// Bilinear interpolation that skips cells marked with `missing`.
///
/// Presence is judged from the lower-left corner alone and applied to all
/// four terms. When no weight survives the result is `missing`.
pub fn bilinear_missing(data: &Array2D, i: f64, j: f64, missing: f64) -> f64 {
    let stencil = bilinear_weights(i, j);
    debug_check_stencil(data, i, j, &stencil);

    let present = if data[(stencil.j0, stencil.i0)] != missing {
        1.0
    } else {
        0.0
    };

    let mut weighted_sum = 0.0;
    let mut sum_of_weights = 0.0;
    for (cell, weight) in stencil.corners() {
        weighted_sum += weight * data[cell] * present;
        sum_of_weights += weight * present;
    }

    if sum_of_weights == 0.0 {
        weighted_sum += missing;
        sum_of_weights += 1.0;
    }

    weighted_sum / sum_of_weights
}

/// Interpolate `data` at every index pair, giving an array of the
/// indices' shape.
pub fn resample(data: &Array2D, indices: &FractionalIndices) -> Array2D {
    let (rows, cols) = indices.shape();
    Array2D::from_fn(rows, cols, |x, y| {
        let (i, j) = indices.get(x, y);
        bilinear(data, i, j)
    })
}

/// Missing-aware variant of [`resample`].
pub fn resample_missing(data: &Array2D, indices: &FractionalIndices, missing: f64) -> Array2D {
    let (rows, cols) = indices.shape();
    Array2D::from_fn(rows, cols, |x, y| {
        let (i, j) = indices.get(x, y);
        bilinear_missing(data, i, j, missing)
    })
}
