//! Regular longitude/latitude grid, as used by ERA5.
//!
//! Maps geographic coordinates to fractional indices on an evenly spaced
//! lon/lat grid. Longitude indices wrap around the axis length so targets
//! on either side of the antimeridian land on the same columns. Latitude
//! spacing is taken from the first two axis points, which is only an
//! approximation on a Gaussian grid.

use crate::error::{ProjectionError, ProjectionResult};

/// Regular lon/lat grid described by its first point and spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularLonLat {
    /// First longitude of the axis (degrees)
    pub lon0: f64,
    /// Longitude spacing (degrees)
    pub dlon: f64,
    /// Number of longitude points
    pub nlon: usize,
    /// First latitude of the axis (degrees)
    pub lat0: f64,
    /// Latitude spacing (degrees, negative for north-to-south axes)
    pub dlat: f64,
    /// Number of latitude points
    pub nlat: usize,
}

impl RegularLonLat {
    /// Build the transform from a product's 1-D coordinate axes.
    pub fn from_axes(lons: &[f64], lats: &[f64]) -> ProjectionResult<Self> {
        let (lon0, dlon) = axis_origin("longitude", lons)?;
        let (lat0, dlat) = axis_origin("latitude", lats)?;

        Ok(Self {
            lon0,
            dlon,
            nlon: lons.len(),
            lat0,
            dlat,
            nlat: lats.len(),
        })
    }

    /// Convert geographic coordinates (degrees) to fractional grid indices.
    ///
    /// Returns `(i, j)` where `i` is the longitude column, reduced into
    /// `[0, nlon)`, and `j` the latitude row.
    pub fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let n = self.nlon as f64;
        let mut i = ((lon_deg - self.lon0) / self.dlon).rem_euclid(n);
        // rem_euclid rounds tiny negative offsets up to exactly n
        if i >= n {
            i -= n;
        }
        let j = (lat_deg - self.lat0) / self.dlat;
        (i, j)
    }

    /// Convert fractional grid indices back to `(lon, lat)` in degrees.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        (self.lon0 + i * self.dlon, self.lat0 + j * self.dlat)
    }

    /// Grid dimensions as `(nlon, nlat)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nlon, self.nlat)
    }
}

fn axis_origin(name: &str, axis: &[f64]) -> ProjectionResult<(f64, f64)> {
    if axis.len() < 2 {
        return Err(ProjectionError::invalid_axis(
            name,
            format!("need at least 2 points, got {}", axis.len()),
        ));
    }
    let step = axis[1] - axis[0];
    if step == 0.0 || !step.is_finite() {
        return Err(ProjectionError::invalid_axis(
            name,
            format!("spacing must be finite and non-zero, got {}", step),
        ));
    }
    Ok((axis[0], step))
}
