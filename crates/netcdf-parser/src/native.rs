//! Thin helpers over the native netcdf library.

use std::path::Path;
use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes such as `scale_factor` that don't exist). This function
/// disables that output by calling H5Eset_auto2 with null handlers.
///
/// Call this early in `main()`, before any NetCDF operations occur. It only
/// needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a file for reading, tagging failures with its path.
pub(crate) fn open(path: &Path) -> NetCdfResult<netcdf::File> {
    netcdf::open(path).map_err(|e| NetCdfError::library(path.display().to_string(), e))
}

/// Look up a variable that must exist.
pub(crate) fn required_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::missing(format!("{} variable", name)))
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a numeric attribute as f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a string attribute from a group.
pub(crate) fn get_group_str_attr(group: &netcdf::Group, name: &str) -> Option<String> {
    let attr_value = group.attribute(name)?.value().ok()?;
    String::try_from(attr_value).ok()
}

/// Lengths of a variable's dimensions, outermost first.
pub(crate) fn shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|dim| dim.len()).collect()
}
