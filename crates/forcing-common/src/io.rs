//! Seams between the numeric core and the file layer.
//!
//! The regridding engine reads source data through [`SourceReader`] and
//! emits results through [`ForcingSink`]; neither knows about NetCDF.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{ForcingError, ForcingResult};
use crate::grid::{Array2D, ElementGrid};

/// Read access to source product files, addressed by file name.
pub trait SourceReader {
    /// Read a 1-D coordinate axis such as `longitude`.
    fn axis(&mut self, file: &str, name: &str) -> ForcingResult<Vec<f64>>;

    /// Read a 2-D coordinate field such as a curvilinear `latitude`.
    fn coordinates(&mut self, file: &str, name: &str) -> ForcingResult<Array2D>;

    /// Recorded time values of a file, in the file's own units.
    fn time_axis(&mut self, file: &str) -> ForcingResult<Vec<f64>>;

    /// The 2-D spatial slice of `variable` at time record `record`.
    fn slice(&mut self, file: &str, variable: &str, record: usize) -> ForcingResult<Array2D>;
}

/// Destination of one forcing output file.
pub trait ForcingSink {
    /// Store the element-centred coordinates.
    fn write_coordinates(&mut self, elements: &ElementGrid) -> ForcingResult<()>;

    /// Declare a `(time, x, y)` field before any of its slices are written.
    fn declare_field(&mut self, name: &str) -> ForcingResult<()>;

    /// Store the Unix time of output step `index`.
    fn write_time(&mut self, index: usize, unix_seconds: i64) -> ForcingResult<()>;

    /// Store one time step of a declared field.
    fn write_slice(&mut self, name: &str, index: usize, slice: &Array2D) -> ForcingResult<()>;

    /// Flush and close the output.
    fn finalize(&mut self) -> ForcingResult<()>;
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    coordinates: Option<ElementGrid>,
    field_order: Vec<String>,
    fields: HashMap<String, BTreeMap<usize, Array2D>>,
    times: BTreeMap<usize, i64>,
    finalized: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinates(&self) -> Option<&ElementGrid> {
        self.coordinates.as_ref()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> &[String] {
        &self.field_order
    }

    /// Slice `index` of field `name`, if written.
    pub fn slice(&self, name: &str, index: usize) -> Option<&Array2D> {
        self.fields.get(name)?.get(&index)
    }

    /// Number of slices written for `name`.
    pub fn step_count(&self, name: &str) -> usize {
        self.fields.get(name).map_or(0, |steps| steps.len())
    }

    /// Written times ordered by step index.
    pub fn times(&self) -> Vec<i64> {
        self.times.values().copied().collect()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn check_open(&self) -> ForcingResult<()> {
        if self.finalized {
            return Err(ForcingError::DataWriteError(
                "sink already finalized".to_string(),
            ));
        }
        Ok(())
    }
}

impl ForcingSink for MemorySink {
    fn write_coordinates(&mut self, elements: &ElementGrid) -> ForcingResult<()> {
        self.check_open()?;
        self.coordinates = Some(elements.clone());
        Ok(())
    }

    fn declare_field(&mut self, name: &str) -> ForcingResult<()> {
        self.check_open()?;
        if !self.fields.contains_key(name) {
            self.field_order.push(name.to_string());
            self.fields.insert(name.to_string(), BTreeMap::new());
        }
        Ok(())
    }

    fn write_time(&mut self, index: usize, unix_seconds: i64) -> ForcingResult<()> {
        self.check_open()?;
        self.times.insert(index, unix_seconds);
        Ok(())
    }

    fn write_slice(&mut self, name: &str, index: usize, slice: &Array2D) -> ForcingResult<()> {
        self.check_open()?;
        if let Some(coords) = &self.coordinates {
            if coords.shape() != slice.shape() {
                return Err(ForcingError::shape_mismatch(
                    name,
                    coords.shape(),
                    slice.shape(),
                ));
            }
        }
        let steps = self
            .fields
            .get_mut(name)
            .ok_or_else(|| ForcingError::UnknownField(name.to_string()))?;
        steps.insert(index, slice.clone());
        Ok(())
    }

    fn finalize(&mut self) -> ForcingResult<()> {
        self.check_open()?;
        debug!(
            fields = self.field_order.len(),
            steps = self.times.len(),
            "Finalized in-memory forcing output"
        );
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(nx: usize, ny: usize) -> ElementGrid {
        ElementGrid::new(Array2D::zeros(nx, ny), Array2D::zeros(nx, ny)).unwrap()
    }

    #[test]
    fn test_memory_sink_records_slices() {
        let mut sink = MemorySink::new();
        sink.write_coordinates(&elements(2, 3)).unwrap();
        sink.declare_field("tair").unwrap();
        sink.write_slice("tair", 1, &Array2D::filled(2, 3, 7.0)).unwrap();
        sink.write_time(1, 3600).unwrap();

        assert_eq!(sink.field_names(), &["tair".to_string()]);
        assert_eq!(sink.step_count("tair"), 1);
        assert_eq!(sink.slice("tair", 1).unwrap()[(1, 2)], 7.0);
        assert_eq!(sink.times(), vec![3600]);
    }

    #[test]
    fn test_memory_sink_rejects_undeclared_field() {
        let mut sink = MemorySink::new();
        let err = sink.write_slice("sst", 0, &Array2D::zeros(1, 1)).unwrap_err();
        assert!(matches!(err, ForcingError::UnknownField(_)));
    }

    #[test]
    fn test_memory_sink_rejects_wrong_shape() {
        let mut sink = MemorySink::new();
        sink.write_coordinates(&elements(2, 2)).unwrap();
        sink.declare_field("sst").unwrap();
        assert!(sink.write_slice("sst", 0, &Array2D::zeros(3, 2)).is_err());
    }

    #[test]
    fn test_memory_sink_closed_after_finalize() {
        let mut sink = MemorySink::new();
        sink.finalize().unwrap();
        assert!(sink.is_finalized());
        assert!(sink.declare_field("sst").is_err());
    }
}
