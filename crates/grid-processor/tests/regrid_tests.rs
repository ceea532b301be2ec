//! End-to-end regridding on synthetic source grids.
//!
//! Linear fields are reproduced exactly by bilinear interpolation on a
//! regular grid, so results are compared against the analytic value at the
//! computed element centres.

use forcing_common::{Array2D, ElementGrid};
use grid_processor::{elementize, latitude_fit_rms, regrid_polar, regrid_regular};
use projection::{PolarGrid, PolarGridConfig, RadialProfile, RegularLonLat};
use test_utils::{
    assert_approx_eq, assert_array_approx_eq, assert_coords_approx_eq, axis,
    curvilinear_coordinates, global_axes, grid, linear_field, mesh, rectangular_mesh, sentinel,
    with_missing,
};

// ============================================================================
// Regular source grid
// ============================================================================

#[test]
fn test_linear_field_reproduced_at_element_centres() {
    // 4x4 regular source grid, f = lon + 2 * lat
    let lons = axis(0.0, 1.0, 4);
    let lats = axis(60.0, 1.0, 4);
    let data = linear_field(&lons, &lats, 0.0, 1.0, 2.0);
    let grid = RegularLonLat::from_axes(&lons, &lats).unwrap();

    // 2x2 elements inside the grid
    let mesh = rectangular_mesh(0.5, 60.5, 1.0, 1.0, 2, 2);
    let elements = elementize(&mesh).unwrap();

    let out = regrid_regular(&data, &grid, &elements).unwrap();
    assert_eq!(out.shape(), (2, 2));

    for x in 0..2 {
        for y in 0..2 {
            let expected = elements.lon()[(x, y)] + 2.0 * elements.lat()[(x, y)];
            assert_approx_eq!(out[(x, y)], expected, 1e-9);
        }
    }
}

#[test]
fn test_descending_latitudes_like_era5() {
    let lons = axis(0.0, 0.25, 1440);
    let lats = axis(90.0, -0.25, 121);
    let data = linear_field(&lons, &lats, 100.0, 0.0, -1.0);
    let grid = RegularLonLat::from_axes(&lons, &lats).unwrap();

    let mesh = rectangular_mesh(-10.0, 70.0, 2.0, 1.0, 10, 5);
    let elements = elementize(&mesh).unwrap();
    let out = regrid_regular(&data, &grid, &elements).unwrap();

    for (value, lat) in out.iter().zip(elements.lat().iter()) {
        assert_approx_eq!(*value, 100.0 - lat, 1e-9);
    }
}

#[test]
fn test_element_just_west_of_first_column() {
    let spec = grid::ERA5_GLOBAL;
    let (lons, lats) = global_axes(spec.resolution);
    let data = linear_field(&lons, &lats, 0.0, 0.0, 1.0);
    assert_eq!(data.len(), spec.size());
    let source = RegularLonLat::from_axes(&lons, &lats).unwrap();
    assert_eq!(source.dimensions(), (spec.nlon, spec.nlat));

    // Rounds to exactly nlon columns before folding
    let lon = Array2D::filled(1, 1, lons[0] - 1e-15);
    let lat = Array2D::filled(1, 1, 85.0);
    let elements = ElementGrid::new(lon, lat).unwrap();

    let out = regrid_regular(&data, &source, &elements).unwrap();
    assert_approx_eq!(out[(0, 0)], 85.0, 1e-9);
}

#[test]
fn test_mesh_across_prime_meridian() {
    let spec = grid::COARSE_GLOBAL;
    let (lons, lats) = global_axes(spec.resolution);
    let data = linear_field(&lons, &lats, 5.0, 0.0, 2.0);
    let source = RegularLonLat::from_axes(&lons, &lats).unwrap();
    assert_eq!(source.dimensions(), (spec.nlon, spec.nlat));

    let (lon0, lat0, dlon, dlat, nx, ny) = mesh::PRIME_MERIDIAN;
    let elements = elementize(&rectangular_mesh(lon0, lat0, dlon, dlat, nx, ny)).unwrap();
    assert!(elements.lon().iter().any(|&lon| lon < 0.0));
    assert!(elements.lon().iter().any(|&lon| lon > 0.0));

    let out = regrid_regular(&data, &source, &elements).unwrap();
    let expected = elements.lat().map(|lat| 5.0 + 2.0 * lat);
    assert_array_approx_eq!(out, expected, 1e-9);
}

// ============================================================================
// Polar source grid
// ============================================================================

/// Small TOPAZ-like grid: one cell per degree near the pole.
fn synthetic_polar() -> (PolarGrid, Array2D, Array2D) {
    let config = PolarGridConfig {
        center: (20.0, 20.0),
        angular_scale: 1.0 / 1.0_f64.to_radians(),
        reference_longitude: 315.0_f64.to_radians(),
    };
    let (lon, lat) = curvilinear_coordinates(41, 41, |i, j| config.grid_to_geo(i, j));
    let profile = RadialProfile::from_coordinates(&lat, &config).unwrap();
    (PolarGrid::new(config, profile), lon, lat)
}

#[test]
fn test_polar_grid_center_maps_to_center() {
    let (grid, _, _) = synthetic_polar();
    let (i, j) = grid.geo_to_grid(0.0, 90.0);
    assert_coords_approx_eq!((i, j), (20.0, 20.0), 1e-6);
}

#[test]
fn test_polar_latitude_field_recovered() {
    let (grid, _, lat) = synthetic_polar();
    let mesh = rectangular_mesh(-40.0, 76.0, 8.0, 1.0, 10, 4);
    let elements = elementize(&mesh).unwrap();

    let out = regrid_polar(&lat, &grid, &elements, sentinel::TOPAZ4_MISSING);
    for (value, expected) in out.iter().zip(elements.lat().iter()) {
        assert_approx_eq!(*value, *expected, 0.05);
    }

    let rms = latitude_fit_rms(&lat, &grid, &elements).unwrap();
    assert!(rms < 0.05, "latitude fit RMS too large: {}", rms);
}

#[test]
fn test_polar_land_cells_resolve_to_sentinel() {
    let (grid, _, lat) = synthetic_polar();
    let mesh = rectangular_mesh(-40.0, 76.0, 20.0, 1.0, 2, 2);
    let elements = elementize(&mesh).unwrap();

    // Mark the lower-left stencil corner of element (0, 0) as land
    let (i, j) = grid.geo_to_grid(elements.lon()[(0, 0)], elements.lat()[(0, 0)]);
    let land = (j.floor() as usize, i.floor() as usize);
    let data = with_missing(&lat, &[land], sentinel::TOPAZ4_MISSING);

    let out = regrid_polar(&data, &grid, &elements, sentinel::TOPAZ4_MISSING);
    assert_eq!(out[(0, 0)], sentinel::TOPAZ4_MISSING);
    assert!(out[(1, 1)] > 70.0);
}
