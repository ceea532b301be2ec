//! Coordinate transforms from geographic coordinates to source grid indices.
//!
//! Two source grid families are supported:
//! - [`RegularLonLat`]: evenly spaced lon/lat axes with longitude wraparound
//! - [`PolarGrid`]: polar curvilinear grid inverted through a latitude profile
//!
//! Both expose `geo_to_grid(lon, lat) -> (i, j)` returning fractional
//! indices, where `i` addresses source columns and `j` source rows.

pub mod error;
pub mod polar;
pub mod regular;
pub mod sphere;

pub use error::{ProjectionError, ProjectionResult};
pub use polar::{PolarGrid, PolarGridConfig, RadialProfile};
pub use regular::RegularLonLat;

/// Inverse map from geographic coordinates to a source grid's index space.
pub trait GridTransform {
    /// Fractional `(i, j)` of `(lon, lat)` in degrees.
    fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64);
}

impl GridTransform for RegularLonLat {
    fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        RegularLonLat::geo_to_grid(self, lon_deg, lat_deg)
    }
}

impl GridTransform for PolarGrid {
    fn geo_to_grid(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        PolarGrid::geo_to_grid(self, lon_deg, lat_deg)
    }
}
