//! Geographic coordinates on the unit sphere.

use nalgebra::Vector3;

/// Cartesian unit vector for `(lon, lat)` in degrees.
pub fn to_unit_vector(lon_deg: f64, lat_deg: f64) -> Vector3<f64> {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// `(lon, lat)` in degrees of the direction of `v`.
///
/// `v` need not be normalized. The zero vector has no direction and yields
/// `(0, 0)`.
pub fn from_vector(v: &Vector3<f64>) -> (f64, f64) {
    let lon = v.y.atan2(v.x).to_degrees();
    let lat = v.z.atan2(v.x.hypot(v.y)).to_degrees();
    (lon, lat)
}

/// Spherical centroid of a set of points, as `(lon, lat)` in degrees.
pub fn centroid(points: &[(f64, f64)]) -> (f64, f64) {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, &(lon, lat)| acc + to_unit_vector(lon, lat));
    from_vector(&sum)
}

/// Wrap a longitude into `[-180, 180)`.
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}
