//! Reading source product files (ERA5, TOPAZ4) from a directory.

use std::path::PathBuf;

use forcing_common::{Array2D, ForcingResult, SourceReader};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{self, get_f64_attr, silence_hdf5_errors};

/// [`SourceReader`] over NetCDF files in one directory.
///
/// Files are opened on every call and closed again; nothing is cached.
/// Packed values are unpacked with `scale_factor` / `add_offset`, and
/// `_FillValue` cells are replaced by the configured missing value.
#[derive(Debug, Clone)]
pub struct NetCdfSourceReader {
    root_dir: PathBuf,
    missing_value: f64,
}

impl NetCdfSourceReader {
    /// Reader for files under `root_dir`; fill values become NaN.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        silence_hdf5_errors();
        Self {
            root_dir: root_dir.into(),
            missing_value: f64::NAN,
        }
    }

    /// Replace fill values with `missing_value` instead of NaN.
    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = missing_value;
        self
    }

    pub fn missing_value(&self) -> f64 {
        self.missing_value
    }

    fn open(&self, file: &str) -> NetCdfResult<netcdf::File> {
        native::open(&self.root_dir.join(file))
    }

    fn read_axis(&self, file: &str, name: &str) -> NetCdfResult<Vec<f64>> {
        let nc = self.open(file)?;
        let var = native::required_variable(&nc, name)?;
        var.get_values(..).map_err(|e| NetCdfError::library(file, e))
    }

    fn read_coordinates(&self, file: &str, name: &str) -> NetCdfResult<Array2D> {
        let nc = self.open(file)?;
        let var = native::required_variable(&nc, name)?;
        let (rows, cols) = match native::shape(&var).as_slice() {
            [rows, cols] => (*rows, *cols),
            dims => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} in {} must be 2-D, got shape {:?}",
                    name, file, dims
                )))
            }
        };
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| NetCdfError::library(file, e))?;
        Ok(Array2D::new(rows, cols, values)?)
    }

    fn read_slice(&self, file: &str, variable: &str, record: usize) -> NetCdfResult<Array2D> {
        let nc = self.open(file)?;
        let var = native::required_variable(&nc, variable)?;
        let dims = native::shape(&var);

        // (time, rows, cols), or (time, depth, rows, cols) with a single depth
        let raw: Vec<f64> = match dims.as_slice() {
            [records, _, _] | [records, 1, _, _] if record >= *records => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "record {} beyond {} records of {} in {}",
                    record, records, variable, file
                )))
            }
            [_, _, _] => var.get_values::<f64, _>((record, .., ..)),
            [_, 1, _, _] => var.get_values::<f64, _>((record, 0usize, .., ..)),
            _ => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} in {} has unsupported shape {:?}",
                    variable, file, dims
                )))
            }
        }
        .map_err(|e| NetCdfError::library(file, e))?;

        let (rows, cols) = (dims[dims.len() - 2], dims[dims.len() - 1]);
        let data = self.unpack(&var, raw);
        debug!(file, variable, record, rows, cols, "Read source slice");
        Ok(Array2D::new(rows, cols, data)?)
    }

    fn unpack(&self, var: &netcdf::Variable, raw: Vec<f64>) -> Vec<f64> {
        let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
        let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);
        let fill_value = get_f64_attr(var, "_FillValue");

        raw.into_iter()
            .map(|val| {
                if Some(val) == fill_value {
                    self.missing_value
                } else {
                    val * scale_factor + add_offset
                }
            })
            .collect()
    }
}

impl SourceReader for NetCdfSourceReader {
    fn axis(&mut self, file: &str, name: &str) -> ForcingResult<Vec<f64>> {
        Ok(self.read_axis(file, name)?)
    }

    fn coordinates(&mut self, file: &str, name: &str) -> ForcingResult<Array2D> {
        Ok(self.read_coordinates(file, name)?)
    }

    fn time_axis(&mut self, file: &str) -> ForcingResult<Vec<f64>> {
        Ok(self.read_axis(file, "time")?)
    }

    fn slice(&mut self, file: &str, variable: &str, record: usize) -> ForcingResult<Array2D> {
        Ok(self.read_slice(file, variable, record)?)
    }
}
