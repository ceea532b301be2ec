//! Element centres of a node-centred mesh.

use forcing_common::{Array2D, ElementGrid, TargetMesh};
use projection::sphere::centroid;

use crate::error::Result;

/// Element-centred lon/lat of `mesh`, shape `(nx, ny)`.
///
/// Each element centre is the spherical centroid of its four nodes, so elements straddling the antimeridian or near the pole get a
/// sensible centre. Longitudes come out in `(-180, 180]`.
pub fn elementize(mesh: &TargetMesh) -> Result<ElementGrid> {
    let (nx, ny) = mesh.element_shape();
    let node_lon = mesh.node_lon();
    let node_lat = mesh.node_lat();

    let mut lon = Array2D::zeros(nx, ny);
    let mut lat = Array2D::zeros(nx, ny);

    for x in 0..nx {
        for y in 0..ny {
            let corners = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
                .map(|node| (node_lon[node], node_lat[node]));

            let (elon, elat) = centroid(&corners);
            lon[(x, y)] = elon;
            lat[(x, y)] = elat;
        }
    }

    Ok(ElementGrid::new(lon, lat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, rectangular_mesh};

    #[test]
    fn test_element_shape() {
        let mesh = rectangular_mesh(0.0, 0.0, 1.0, 1.0, 5, 3);
        let elements = elementize(&mesh).unwrap();
        assert_eq!(elements.shape(), (5, 3));
    }

    #[test]
    fn test_flat_patch_is_arithmetic_mean() {
        // Small cells near the equator are nearly planar
        let mesh = rectangular_mesh(10.0, -0.02, 0.01, 0.01, 3, 3);
        let elements = elementize(&mesh).unwrap();
        for x in 0..3 {
            for y in 0..3 {
                let expected_lon = 10.0 + (x as f64 + 0.5) * 0.01;
                let expected_lat = -0.02 + (y as f64 + 0.5) * 0.01;
                assert_approx_eq!(elements.lon()[(x, y)], expected_lon, 1e-6);
                assert_approx_eq!(elements.lat()[(x, y)], expected_lat, 1e-6);
            }
        }
    }

    #[test]
    fn test_element_across_antimeridian() {
        let mesh = rectangular_mesh(179.0, 10.0, 2.0, 1.0, 1, 1);
        let elements = elementize(&mesh).unwrap();
        // Nodes at 179 and 181 (= -179) straddle the seam
        assert_approx_eq!(elements.lon()[(0, 0)].abs(), 180.0, 1e-9);
        assert!(elements.lat()[(0, 0)] > 10.0 && elements.lat()[(0, 0)] < 11.0);
    }

    #[test]
    fn test_longitudes_are_wrapped() {
        let mesh = rectangular_mesh(300.0, 60.0, 1.0, 1.0, 2, 2);
        let elements = elementize(&mesh).unwrap();
        assert_approx_eq!(elements.lon()[(0, 0)], -59.5, 1e-6);
    }
}
