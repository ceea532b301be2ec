//! Resampling source fields onto element centres.
//!
//! Index fields are built once per source grid with [`fractional_indices`]
//! and then applied to each field slice with the interpolators.

pub mod interpolation;

pub use interpolation::{
    bilinear, bilinear_missing, bilinear_weights, resample, resample_missing, BilinearWeights,
};

use forcing_common::{Array2D, ElementGrid};
use projection::{GridTransform, PolarGrid, RegularLonLat};
use tracing::debug;

use crate::error::{GridProcessorError, Result};
use crate::types::FractionalIndices;

/// Fractional source indices of every element centre under `transform`.
pub fn fractional_indices<T>(transform: &T, elements: &ElementGrid) -> FractionalIndices
where
    T: GridTransform + ?Sized,
{
    let (nx, ny) = elements.shape();
    let mut i = Array2D::zeros(nx, ny);
    let mut j = Array2D::zeros(nx, ny);

    for x in 0..nx {
        for y in 0..ny {
            let (gi, gj) = transform.geo_to_grid(elements.lon()[(x, y)], elements.lat()[(x, y)]);
            i[(x, y)] = gi;
            j[(x, y)] = gj;
        }
    }

    FractionalIndices { i, j }
}

/// Append the first column after the last, so a stencil starting in the
/// last column of a global grid reads across the seam.
pub fn extend_periodic(data: &Array2D) -> Array2D {
    let cols = data.cols();
    Array2D::from_fn(data.rows(), cols + 1, |row, col| data[(row, col % cols)])
}

/// Resample a regular lon/lat field onto element centres.
///
/// `data` must have shape `(nlat, nlon)`.
pub fn regrid_regular(
    data: &Array2D,
    grid: &RegularLonLat,
    elements: &ElementGrid,
) -> Result<Array2D> {
    let (nlon, nlat) = grid.dimensions();
    let expected = (nlat, nlon);
    if data.shape() != expected {
        return Err(GridProcessorError::shape_mismatch(
            "regular source field",
            expected,
            data.shape(),
        ));
    }

    let indices = fractional_indices(grid, elements);
    debug!(
        source_shape = ?data.shape(),
        target_shape = ?indices.shape(),
        "Resampling regular field"
    );
    Ok(resample(&extend_periodic(data), &indices))
}

/// Resample a polar curvilinear field onto element centres, treating
/// `missing` as absent data.
pub fn regrid_polar(
    data: &Array2D,
    grid: &PolarGrid,
    elements: &ElementGrid,
    missing: f64,
) -> Array2D {
    let indices = fractional_indices(grid, elements);
    debug!(
        source_shape = ?data.shape(),
        target_shape = ?indices.shape(),
        missing,
        "Resampling polar field"
    );
    resample_missing(data, &indices, missing)
}

/// Root-mean-square difference between the source latitude field
/// interpolated onto the elements and the element latitudes.
///
/// Measures how well a polar transform fits the grid it was built for.
pub fn latitude_fit_rms(
    source_lat: &Array2D,
    grid: &PolarGrid,
    elements: &ElementGrid,
) -> Result<f64> {
    let indices = fractional_indices(grid, elements);
    let fitted = resample(source_lat, &indices);
    let diff = fitted.zip_map(elements.lat(), |a, b| (a - b) * (a - b))?;

    if diff.is_empty() {
        return Ok(0.0);
    }
    Ok((diff.iter().sum::<f64>() / diff.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, axis, linear_field};

    fn elements_at(points: &[(f64, f64)]) -> ElementGrid {
        let lon = Array2D::new(points.len(), 1, points.iter().map(|p| p.0).collect()).unwrap();
        let lat = Array2D::new(points.len(), 1, points.iter().map(|p| p.1).collect()).unwrap();
        ElementGrid::new(lon, lat).unwrap()
    }

    #[test]
    fn test_fractional_indices_regular() {
        let grid = RegularLonLat::from_axes(&axis(0.0, 1.0, 10), &axis(60.0, 1.0, 10)).unwrap();
        let indices = fractional_indices(&grid, &elements_at(&[(2.5, 61.25), (-1.0, 65.0)]));
        assert_eq!(indices.get(0, 0), (2.5, 1.25));
        assert_eq!(indices.get(1, 0), (9.0, 5.0));
    }

    #[test]
    fn test_extend_periodic() {
        let data = Array2D::from_fn(2, 3, |row, col| (row * 10 + col) as f64);
        let extended = extend_periodic(&data);
        assert_eq!(extended.shape(), (2, 4));
        assert_eq!(extended[(1, 3)], 10.0);
        assert_eq!(extended[(1, 2)], 12.0);
    }

    #[test]
    fn test_regrid_regular_across_seam() {
        // 1 degree global axes; f depends on latitude only so the seam is smooth
        let lons = axis(0.0, 1.0, 360);
        let lats = axis(80.0, -1.0, 10);
        let data = linear_field(&lons, &lats, 0.0, 0.0, 1.0);
        let grid = RegularLonLat::from_axes(&lons, &lats).unwrap();

        let out = regrid_regular(&data, &grid, &elements_at(&[(359.5, 75.5), (-0.25, 78.0)])).unwrap();
        assert_approx_eq!(out[(0, 0)], 75.5, 1e-9);
        assert_approx_eq!(out[(1, 0)], 78.0, 1e-9);
    }

    #[test]
    fn test_regrid_regular_rejects_wrong_shape() {
        let grid = RegularLonLat::from_axes(&axis(0.0, 1.0, 4), &axis(0.0, 1.0, 3)).unwrap();
        let err = regrid_regular(&Array2D::zeros(4, 3), &grid, &elements_at(&[(0.5, 0.5)]))
            .unwrap_err();
        assert!(matches!(err, GridProcessorError::ShapeMismatch { .. }));
    }
}
