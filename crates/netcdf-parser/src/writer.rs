//! Writing forcing output files.
//!
//! Layout:
//!
//! ```text
//! /structure            type = "parametric_rectangular"
//! /metadata             type = "parametric_rectangular"
//!   /configuration      (empty)
//!   /time               formatted (string), time (i64, seconds since 1970)
//! /data                 dims x, y, time (unlimited)
//!   longitude(x, y), latitude(x, y), time(time), <field>(time, x, y)
//! ```

use std::path::{Path, PathBuf};

use forcing_common::time::{format_timestamp, TimeConvention};
use forcing_common::{Array2D, ElementGrid, ForcingError, ForcingResult, ForcingSink};
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::mesh::PARAMETRIC_RECTANGULAR;
use crate::native::silence_hdf5_errors;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// [`ForcingSink`] writing one NetCDF-4 forcing file.
///
/// The file is closed by [`ForcingSink::finalize`], or on drop.
pub struct NetCdfForcingWriter {
    file: Option<netcdf::FileMut>,
    path: PathBuf,
    element_shape: Option<(usize, usize)>,
    fields: Vec<String>,
    steps: usize,
}

impl NetCdfForcingWriter {
    /// Create `path` and write the structure and metadata groups, stamped
    /// with `start_unix` (seconds since 1970).
    pub fn create(path: &Path, start_unix: i64) -> NetCdfResult<Self> {
        silence_hdf5_errors();
        let name = path.display().to_string();
        let fail = |e: netcdf::Error| NetCdfError::write_failed(&name, e);

        let mut file = netcdf::create(path).map_err(fail)?;

        {
            let mut structure = file.add_group("structure").map_err(fail)?;
            structure
                .add_attribute("type", PARAMETRIC_RECTANGULAR)
                .map_err(fail)?;
        }

        {
            let mut metadata = file.add_group("metadata").map_err(fail)?;
            metadata
                .add_attribute("type", PARAMETRIC_RECTANGULAR)
                .map_err(fail)?;
            metadata.add_group("configuration").map_err(fail)?;

            let formatted_start = format_timestamp(start_unix)
                .map_err(|e| NetCdfError::write_failed(&name, e))?;
            let mut time_group = metadata.add_group("time").map_err(fail)?;
            {
                let mut formatted = time_group
                    .add_string_variable("formatted", &[])
                    .map_err(fail)?;
                formatted.put_attribute("format", TIME_FORMAT).map_err(fail)?;
                formatted.put_string(&formatted_start, ..).map_err(fail)?;
            }
            let mut time = time_group.add_variable::<i64>("time", &[]).map_err(fail)?;
            time.put_value(start_unix, ..).map_err(fail)?;
            time.put_attribute("units", TimeConvention::Unix.units()).map_err(fail)?;
        }

        file.add_group("data").map_err(fail)?;

        info!(file = %name, "Created forcing file");
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            element_shape: None,
            fields: Vec::new(),
            steps: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of time steps written so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn data_group(&mut self) -> NetCdfResult<netcdf::GroupMut<'_>> {
        let name = self.name();
        self.file
            .as_mut()
            .ok_or_else(|| NetCdfError::write_failed(&name, "file already finalized"))?
            .group_mut("data")
            .map_err(|e| NetCdfError::write_failed(&name, e))?
            .ok_or_else(|| NetCdfError::write_failed(name, "data group missing"))
    }

    fn put_coordinates(&mut self, elements: &ElementGrid) -> NetCdfResult<()> {
        let name = self.name();
        let fail = |e: netcdf::Error| NetCdfError::write_failed(&name, e);
        let (nx, ny) = elements.shape();

        {
            let mut data = self.data_group()?;
            data.add_dimension("x", nx).map_err(fail)?;
            data.add_dimension("y", ny).map_err(fail)?;
            data.add_unlimited_dimension("time").map_err(fail)?;

            for (var_name, values, units) in [
                ("longitude", elements.lon(), "degrees_east"),
                ("latitude", elements.lat(), "degrees_north"),
            ] {
                let mut var = data
                    .add_variable::<f64>(var_name, &["x", "y"])
                    .map_err(fail)?;
                var.put_attribute("units", units).map_err(fail)?;
                var.put_values(values.as_slice(), ..).map_err(fail)?;
            }

            let mut time = data.add_variable::<f64>("time", &["time"]).map_err(fail)?;
            time.put_attribute("units", TimeConvention::Unix.units()).map_err(fail)?;
        }

        self.element_shape = Some((nx, ny));
        Ok(())
    }

    fn put_field(&mut self, field: &str) -> NetCdfResult<()> {
        let name = self.name();
        if self.element_shape.is_none() {
            return Err(NetCdfError::write_failed(
                name,
                "coordinates must be written before fields",
            ));
        }
        if self.fields.iter().any(|f| f == field) {
            return Ok(());
        }

        {
            let mut data = self.data_group()?;
            data.add_variable::<f64>(field, &["time", "x", "y"])
                .map_err(|e| NetCdfError::write_failed(&name, e))?;
        }
        self.fields.push(field.to_string());
        debug!(file = %name, field, "Declared field");
        Ok(())
    }

    fn put_time(&mut self, index: usize, unix_seconds: i64) -> NetCdfResult<()> {
        let name = self.name();
        {
            let mut data = self.data_group()?;
            let mut time = data
                .variable_mut("time")
                .ok_or_else(|| NetCdfError::write_failed(&name, "time variable missing"))?;
            time.put_value(unix_seconds as f64, [index])
                .map_err(|e| NetCdfError::write_failed(&name, e))?;
        }
        self.steps = self.steps.max(index + 1);
        Ok(())
    }

    fn put_slice(&mut self, field: &str, index: usize, slice: &Array2D) -> NetCdfResult<()> {
        let name = self.name();
        let expected = self
            .element_shape
            .ok_or_else(|| NetCdfError::write_failed(&name, "coordinates not written"))?;
        if slice.shape() != expected {
            return Err(ForcingError::shape_mismatch(field, expected, slice.shape()).into());
        }
        if !self.fields.iter().any(|f| f == field) {
            return Err(ForcingError::UnknownField(field.to_string()).into());
        }

        let mut data = self.data_group()?;
        let mut var = data.variable_mut(field).ok_or_else(|| {
            NetCdfError::write_failed(&name, format!("{} variable missing", field))
        })?;
        var.put_values(slice.as_slice(), (index, .., ..))
            .map_err(|e| NetCdfError::write_failed(&name, e))?;
        Ok(())
    }
}

impl ForcingSink for NetCdfForcingWriter {
    fn write_coordinates(&mut self, elements: &ElementGrid) -> ForcingResult<()> {
        Ok(self.put_coordinates(elements)?)
    }

    fn declare_field(&mut self, name: &str) -> ForcingResult<()> {
        Ok(self.put_field(name)?)
    }

    fn write_time(&mut self, index: usize, unix_seconds: i64) -> ForcingResult<()> {
        Ok(self.put_time(index, unix_seconds)?)
    }

    fn write_slice(&mut self, name: &str, index: usize, slice: &Array2D) -> ForcingResult<()> {
        Ok(self.put_slice(name, index, slice)?)
    }

    fn finalize(&mut self) -> ForcingResult<()> {
        let name = self.name();
        if self.file.take().is_none() {
            return Err(NetCdfError::write_failed(name, "file already finalized").into());
        }
        info!(
            file = %name,
            fields = self.fields.len(),
            steps = self.steps,
            "Finished forcing file"
        );
        Ok(())
    }
}
