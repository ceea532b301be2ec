//! Synthetic coordinates and fields for regridding tests.
//!
//! These generators create predictable, verifiable data: linear fields are
//! reproduced exactly by bilinear interpolation, so a test can compare a
//! resampled value against the analytic value at the target point.

use forcing_common::{Array2D, TargetMesh};

/// Longitude and latitude axes of a global regular grid.
///
/// Longitudes run from 0 eastwards, latitudes from 90 southwards, as in
/// ERA5 files.
///
/// # Example
///
/// ```
/// use test_utils::global_axes;
///
/// let (lons, lats) = global_axes(0.25);
/// assert_eq!(lons.len(), 1440);
/// assert_eq!(lats.len(), 721);
/// assert_eq!(lats[0], 90.0);
/// ```
pub fn global_axes(resolution: f64) -> (Vec<f64>, Vec<f64>) {
    let nlon = (360.0 / resolution).round() as usize;
    let nlat = (180.0 / resolution).round() as usize + 1;
    let lons = (0..nlon).map(|k| k as f64 * resolution).collect();
    let lats = (0..nlat).map(|k| 90.0 - k as f64 * resolution).collect();
    (lons, lats)
}

/// Evenly spaced axis of `n` points starting at `start`.
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|k| start + k as f64 * step).collect()
}

/// Source field `f(lon, lat)` on regular axes, shape `(nlat, nlon)`.
pub fn field_on_axes<F>(lons: &[f64], lats: &[f64], f: F) -> Array2D
where
    F: Fn(f64, f64) -> f64,
{
    Array2D::from_fn(lats.len(), lons.len(), |j, i| f(lons[i], lats[j]))
}

/// Linear field `a + b * lon + c * lat` on regular axes.
pub fn linear_field(lons: &[f64], lats: &[f64], a: f64, b: f64, c: f64) -> Array2D {
    field_on_axes(lons, lats, |lon, lat| a + b * lon + c * lat)
}

/// 2-D coordinate fields of a curvilinear grid, shape `(rows, cols)`.
///
/// `to_geo(i, j)` maps a column/row index pair to `(lon, lat)`.
pub fn curvilinear_coordinates<F>(rows: usize, cols: usize, to_geo: F) -> (Array2D, Array2D)
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let lon = Array2D::from_fn(rows, cols, |j, i| to_geo(i as f64, j as f64).0);
    let lat = Array2D::from_fn(rows, cols, |j, i| to_geo(i as f64, j as f64).1);
    (lon, lat)
}

/// Node mesh of `(nx + 1) x (ny + 1)` points on a lon/lat rectangle.
///
/// # Panics
///
/// Panics if `nx` or `ny` is zero.
pub fn rectangular_mesh(
    lon0: f64,
    lat0: f64,
    dlon: f64,
    dlat: f64,
    nx: usize,
    ny: usize,
) -> TargetMesh {
    let lon = Array2D::from_fn(nx + 1, ny + 1, |x, _| lon0 + x as f64 * dlon);
    let lat = Array2D::from_fn(nx + 1, ny + 1, |_, y| lat0 + y as f64 * dlat);
    TargetMesh::new(lon, lat).expect("Failed to build rectangular test mesh")
}

/// Copy of `field` with `sentinel` written at each `(row, col)`.
pub fn with_missing(field: &Array2D, cells: &[(usize, usize)], sentinel: f64) -> Array2D {
    let mut out = field.clone();
    for &cell in cells {
        out[cell] = sentinel;
    }
    out
}
