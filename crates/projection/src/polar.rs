//! Polar curvilinear grid, as used by TOPAZ4.
//!
//! The TOPAZ4 ocean grid is a polar azimuthal projection centred near the
//! North Pole. The radial distance of a grid point from the centre is not
//! a closed-form function of latitude on the real grid, so the inverse
//! projection looks the radius up in a latitude profile sampled along one
//! grid axis, then splits it into planar offsets using the longitude
//! relative to the grid's reference meridian.
//!
//! The projection parameters are:
//! - Centre: fractional `(i, j)` index of the pole
//! - Angular scale: grid cells per radian of the nominal map
//! - Reference longitude: meridian pointing along `+j` from the centre is
//!   `reference_longitude + 180°`

use forcing_common::Array2D;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};
use crate::sphere::normalize_longitude;

/// Named constants of a polar curvilinear grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarGridConfig {
    /// Fractional `(i, j)` index of the projection centre
    pub center: (f64, f64),
    /// Map scale in grid cells per radian
    pub angular_scale: f64,
    /// Reference longitude in radians
    pub reference_longitude: f64,
}

impl Default for PolarGridConfig {
    fn default() -> Self {
        Self::topaz4()
    }
}

impl PolarGridConfig {
    /// TOPAZ4 grid constants.
    pub fn topaz4() -> Self {
        Self {
            center: (380.0, 550.0),
            angular_scale: 1.0 / 0.08982849_f64.to_radians(),
            reference_longitude: 315.0_f64.to_radians(),
        }
    }

    /// Integer `(i, j)` of the centre, used to pick the profile column.
    pub fn center_index(&self) -> (usize, usize) {
        (
            self.center.0.round().max(0.0) as usize,
            self.center.1.round().max(0.0) as usize,
        )
    }

    /// Closed-form forward model of the projection.
    ///
    /// Takes fractional indices and returns `(lon, lat)` in degrees with
    /// `sin(lat) = 1 - (r / angular_scale)^2`. Real grids deviate from this
    /// model, which is why the inverse goes through a [`RadialProfile`].
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = i - self.center.0;
        let y = j - self.center.1;
        let r = x.hypot(y);

        let sin_lat = (1.0 - (r / self.angular_scale).powi(2)).clamp(-1.0, 1.0);
        let lat = sin_lat.asin();
        let lon = self.reference_longitude + x.atan2(-y);

        (normalize_longitude(lon.to_degrees()), lat.to_degrees())
    }

    /// Latitude profile of the forward model at integer radii `0..len`.
    pub fn model_profile(&self, len: usize) -> ProjectionResult<RadialProfile> {
        let latitudes = (0..len)
            .map(|k| self.grid_to_geo(self.center.0, self.center.1 + k as f64).1)
            .collect();
        RadialProfile::new(latitudes)
    }
}

/// Latitudes along one grid axis, outward from the centre, used as a
/// monotone lookup table from latitude to radial index.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialProfile {
    /// Negated latitudes, non-decreasing
    negated: Vec<f64>,
}

impl RadialProfile {
    /// Build from latitudes in native order (non-increasing outward).
    pub fn new(latitudes: Vec<f64>) -> ProjectionResult<Self> {
        if latitudes.len() < 2 {
            return Err(ProjectionError::InvalidProfile(format!(
                "need at least 2 points, got {}",
                latitudes.len()
            )));
        }

        let negated: Vec<f64> = latitudes.iter().map(|lat| -lat).collect();
        if let Some(k) = negated.windows(2).position(|w| !(w[1] >= w[0])) {
            return Err(ProjectionError::InvalidProfile(format!(
                "latitude must not increase away from the centre (index {}: {} -> {})",
                k,
                latitudes[k],
                latitudes[k + 1]
            )));
        }

        Ok(Self { negated })
    }

    /// Extract the profile from a 2-D source latitude field: column
    /// `center_i`, rows `center_j..`.
    pub fn from_coordinates(latitude: &Array2D, config: &PolarGridConfig) -> ProjectionResult<Self> {
        let (ci, cj) = config.center_index();
        if ci >= latitude.cols() || cj >= latitude.rows() {
            return Err(ProjectionError::CenterOutOfBounds {
                i: ci,
                j: cj,
                shape: latitude.shape(),
            });
        }
        Self::new(latitude.column_from(ci, cj))
    }

    pub fn len(&self) -> usize {
        self.negated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.negated.is_empty()
    }

    /// Latitudes in native order.
    pub fn latitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.negated.iter().map(|v| -v)
    }

    /// Continuous radial index at which `lat_deg` occurs.
    ///
    /// Linear interpolation in the table; latitudes beyond either end
    /// clamp to the first or last index.
    pub fn radius(&self, lat_deg: f64) -> f64 {
        let x = -lat_deg;
        if x.is_nan() {
            return f64::NAN;
        }

        let table = &self.negated;
        let last = table.len() - 1;
        if x <= table[0] {
            return 0.0;
        }
        if x >= table[last] {
            return last as f64;
        }

        // First entry strictly above x; 1 <= upper <= last here.
        let upper = table.partition_point(|&v| v <= x);
        let (x0, x1) = (table[upper - 1], table[upper]);
        (upper - 1) as f64 + (x - x0) / (x1 - x0)
    }
}

/// Inverse transform for a polar curvilinear grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarGrid {
    config: PolarGridConfig,
    profile: RadialProfile,
}

impl PolarGrid {
    pub fn new(config: PolarGridConfig, profile: RadialProfile) -> Self {
        Self { config, profile }
    }

    pub fn config(&self) -> &PolarGridConfig {
        &self.config
    }

    pub fn profile(&self) -> &RadialProfile {
        &self.profile
    }

    /// Forward model of the grid's configuration; see
    /// [`PolarGridConfig::grid_to_geo`].
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        self.config.grid_to_geo(i, j)
    }

    /// Convert geographic coordinates (degrees) to fractional grid indices.
    ///
    /// Returns `(i, j)`; points beyond the profile clamp to its outer
    /// radius rather than failing.
    pub fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lon = lon_deg.to_radians();
        let r0 = self.profile.radius(lat_deg);

        let dlon = lon - self.config.reference_longitude;
        let x = r0 * dlon.sin();
        let y = -r0 * dlon.cos();

        (x + self.config.center.0, y + self.config.center.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;

    fn topaz_like() -> PolarGrid {
        let config = PolarGridConfig::topaz4();
        let profile = config.model_profile(500).unwrap();
        PolarGrid::new(config, profile)
    }

    #[test]
    fn test_topaz4_constants() {
        let config = PolarGridConfig::topaz4();
        assert_eq!(config.center_index(), (380, 550));
        assert!((config.angular_scale - 637.835).abs() < 0.01);
        assert!((config.reference_longitude.to_degrees() - 315.0).abs() < 1e-12);
    }

    #[test]
    fn test_center_maps_to_center_index() {
        let grid = topaz_like();
        for lon in [-170.0, -45.0, 0.0, 90.0, 135.0] {
            let (i, j) = grid.geo_to_grid(lon, 90.0);
            assert_coords_approx_eq!((i, j), (380.0, 550.0), 1e-6);
        }
    }

    #[test]
    fn test_profile_axis_points() {
        // Points on the profile column sit at reference longitude + 180
        let grid = topaz_like();
        let lat = grid.profile().latitudes().nth(40).unwrap();
        let (i, j) = grid.geo_to_grid(135.0, lat);
        assert!((i - 380.0).abs() < 1e-9, "i = {}", i);
        assert!((j - 590.0).abs() < 1e-9, "j = {}", j);
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let grid = topaz_like();
        for &(i, j) in &[(400.0, 560.0), (250.5, 700.25), (500.0, 300.0), (381.0, 551.0)] {
            let (lon, lat) = grid.grid_to_geo(i, j);
            let (i2, j2) = grid.geo_to_grid(lon, lat);
            assert!((i - i2).abs() < 1e-3, "i roundtrip failed: {} vs {}", i, i2);
            assert!((j - j2).abs() < 1e-3, "j roundtrip failed: {} vs {}", j, j2);
        }
    }

    #[test]
    fn test_radius_interpolates_and_clamps() {
        let profile = RadialProfile::new(vec![90.0, 80.0, 70.0, 60.0]).unwrap();
        assert_eq!(profile.radius(90.0), 0.0);
        assert_eq!(profile.radius(80.0), 1.0);
        assert!((profile.radius(75.0) - 1.5).abs() < 1e-12);
        assert_eq!(profile.radius(95.0), 0.0);
        assert_eq!(profile.radius(10.0), 3.0);
        assert!(profile.radius(f64::NAN).is_nan());
    }

    #[test]
    fn test_profile_rejects_increasing_latitudes() {
        let err = RadialProfile::new(vec![80.0, 85.0, 70.0]).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidProfile(_)));
    }

    #[test]
    fn test_profile_from_coordinates() {
        let config = PolarGridConfig {
            center: (1.0, 1.0),
            ..PolarGridConfig::topaz4()
        };
        let lat = Array2D::from_fn(4, 3, |row, col| 90.0 - 10.0 * row as f64 - col as f64);
        let profile = RadialProfile::from_coordinates(&lat, &config).unwrap();
        let values: Vec<f64> = profile.latitudes().collect();
        assert_eq!(values, vec![79.0, 69.0, 59.0]);
    }

    #[test]
    fn test_profile_center_out_of_bounds() {
        let lat = Array2D::zeros(4, 3);
        let err = RadialProfile::from_coordinates(&lat, &PolarGridConfig::topaz4()).unwrap_err();
        assert!(matches!(err, ProjectionError::CenterOutOfBounds { .. }));
    }
}
