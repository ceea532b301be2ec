//! Target mesh from a model restart file.
//!
//! The restart file carries a `structure` group whose `type` attribute names
//! the mesh kind, and a `data` group with a `coords` variable of shape
//! `(nx + 1, ny + 1, 2)` holding node longitude (component 0) and latitude
//! (component 1) in degrees.

use std::path::Path;

use forcing_common::{Array2D, TargetMesh};
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{self, get_group_str_attr, silence_hdf5_errors};

/// The only mesh structure the regridder understands.
pub const PARAMETRIC_RECTANGULAR: &str = "parametric_rectangular";

/// Read the node mesh of a restart file, checking its structure type first.
pub fn read_target_mesh(path: &Path) -> NetCdfResult<TargetMesh> {
    silence_hdf5_errors();
    let file = native::open(path)?;
    let file_name = path.display().to_string();

    let structure = file
        .group("structure")
        .map_err(|e| NetCdfError::library(&file_name, e))?
        .ok_or_else(|| NetCdfError::missing("structure group"))?;
    let found = get_group_str_attr(&structure, "type")
        .ok_or_else(|| NetCdfError::missing("structure type attribute"))?;
    if found != PARAMETRIC_RECTANGULAR {
        return Err(NetCdfError::StructureMismatch {
            found,
            expected: PARAMETRIC_RECTANGULAR.to_string(),
        });
    }

    let data = file
        .group("data")
        .map_err(|e| NetCdfError::library(&file_name, e))?
        .ok_or_else(|| NetCdfError::missing("data group"))?;
    let coords = data
        .variable("coords")
        .ok_or_else(|| NetCdfError::missing("coords variable"))?;

    let dims = native::shape(&coords);
    let (rows, cols) = match dims.as_slice() {
        [rows, cols, components] if *components >= 2 => (*rows, *cols),
        _ => {
            return Err(NetCdfError::InvalidFormat(format!(
                "coords must have shape (nx+1, ny+1, 2), got {:?}",
                dims
            )))
        }
    };

    let values: Vec<f64> = coords
        .get_values(..)
        .map_err(|e| NetCdfError::library(&file_name, e))?;
    let components = dims[2];
    let lon = Array2D::from_fn(rows, cols, |x, y| values[(x * cols + y) * components]);
    let lat = Array2D::from_fn(rows, cols, |x, y| values[(x * cols + y) * components + 1]);

    debug!(file = %file_name, nodes = ?(rows, cols), "Read mesh coordinates");
    let mesh = TargetMesh::new(lon, lat)?;
    info!(
        file = %file_name,
        elements = ?mesh.element_shape(),
        "Loaded target mesh"
    );
    Ok(mesh)
}
