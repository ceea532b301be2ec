//! File-level tests against small NetCDF files written on the fly.

use std::path::Path;

use forcing_common::time::TimeConvention;
use forcing_common::{Array2D, ElementGrid, ForcingError, ForcingSink, SourceReader};
use netcdf_parser::{
    read_target_mesh, NetCdfError, NetCdfForcingWriter, NetCdfSourceReader,
    PARAMETRIC_RECTANGULAR,
};
use test_utils::{assert_approx_eq, require_test_file, temp_test_dir};

fn write_restart(path: &Path, structure_type: &str, nodes: (usize, usize)) {
    let (rows, cols) = nodes;
    let mut file = netcdf::create(path).expect("create restart file");
    {
        let mut structure = file.add_group("structure").unwrap();
        structure.add_attribute("type", structure_type).unwrap();
    }
    let mut data = file.add_group("data").unwrap();
    data.add_dimension("nx", rows).unwrap();
    data.add_dimension("ny", cols).unwrap();
    data.add_dimension("two", 2).unwrap();
    let mut coords = data
        .add_variable::<f64>("coords", &["nx", "ny", "two"])
        .unwrap();
    let mut values = Vec::with_capacity(rows * cols * 2);
    for x in 0..rows {
        for y in 0..cols {
            values.push(-10.0 + 5.0 * x as f64);
            values.push(70.0 + 1.0 * y as f64);
        }
    }
    coords.put_values(&values, ..).unwrap();
}

#[test]
fn test_read_target_mesh() {
    let dir = temp_test_dir("mesh");
    let path = dir.path().join("restart.nc");
    write_restart(&path, PARAMETRIC_RECTANGULAR, (4, 3));

    let mesh = read_target_mesh(&path).expect("read mesh");
    assert_eq!(mesh.node_lon().shape(), (4, 3));
    assert_eq!(mesh.element_shape(), (3, 2));
    assert_approx_eq!(mesh.node_lon()[(2, 1)], 0.0, 1e-12);
    assert_approx_eq!(mesh.node_lat()[(2, 1)], 71.0, 1e-12);
}

#[test]
fn test_wrong_structure_type_is_rejected() {
    let dir = temp_test_dir("mesh");
    let path = dir.path().join("restart.nc");
    write_restart(&path, "triangular", (4, 3));

    match read_target_mesh(&path) {
        Err(err @ NetCdfError::StructureMismatch { .. }) => {
            let err = ForcingError::from(err);
            assert!(err.is_precondition());
            match err {
                ForcingError::StructureMismatch { found, expected } => {
                    assert_eq!(found, "triangular");
                    assert_eq!(expected, PARAMETRIC_RECTANGULAR);
                }
                other => panic!("expected StructureMismatch, got {:?}", other),
            }
        }
        other => panic!("expected StructureMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_mesh_file() {
    let dir = temp_test_dir("mesh");
    let err = read_target_mesh(&dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, NetCdfError::Library { .. }));
    let err = ForcingError::from(err);
    assert!(matches!(err, ForcingError::DataReadError(_)));
    assert!(!err.is_precondition());
}

fn small_elements() -> ElementGrid {
    let lon = Array2D::from_fn(3, 2, |x, _| x as f64);
    let lat = Array2D::from_fn(3, 2, |_, y| 70.0 + y as f64);
    ElementGrid::new(lon, lat).unwrap()
}

#[test]
fn test_writer_layout() {
    let dir = temp_test_dir("forcing");
    let path = dir.path().join("ERA5_20100101_20100102.nc");
    let start = 1_262_304_000; // 2010-01-01T00:00:00Z

    let mut writer = NetCdfForcingWriter::create(&path, start).unwrap();
    writer.write_coordinates(&small_elements()).unwrap();
    writer.declare_field("t2m").unwrap();
    for step in 0..2 {
        writer.write_time(step, start + 3600 * step as i64).unwrap();
        let slice = Array2D::filled(3, 2, 270.0 + step as f64);
        writer.write_slice("t2m", step, &slice).unwrap();
    }
    assert_eq!(writer.steps(), 2);
    writer.finalize().unwrap();

    let file = netcdf::open(&path).unwrap();

    let structure = file.group("structure").unwrap().unwrap();
    let kind: String = structure
        .attribute("type")
        .unwrap()
        .value()
        .unwrap()
        .try_into()
        .unwrap();
    assert_eq!(kind, PARAMETRIC_RECTANGULAR);

    let metadata = file.group("metadata").unwrap().unwrap();
    assert!(metadata.group("configuration").is_some());
    let time_meta = metadata.group("time").unwrap();
    let formatted = time_meta.variable("formatted").unwrap();
    assert_eq!(formatted.get_string(..).unwrap(), "2010-01-01T00:00:00Z");
    let stamped: i64 = time_meta.variable("time").unwrap().get_value(..).unwrap();
    assert_eq!(stamped, start);

    let data = file.group("data").unwrap().unwrap();
    let time = data.variable("time").unwrap();
    let times: Vec<f64> = time.get_values(..).unwrap();
    assert_eq!(times, vec![start as f64, (start + 3600) as f64]);
    let units: String = time
        .attribute("units")
        .unwrap()
        .value()
        .unwrap()
        .try_into()
        .unwrap();
    assert_eq!(units, TimeConvention::Unix.units());

    let lat: Vec<f64> = data.variable("latitude").unwrap().get_values(..).unwrap();
    assert_eq!(lat, small_elements().lat().as_slice());

    let t2m = data.variable("t2m").unwrap();
    let dims: Vec<usize> = t2m.dimensions().iter().map(|d| d.len()).collect();
    assert_eq!(dims, vec![2, 3, 2]);
    let second: Vec<f64> = t2m.get_values((1usize, .., ..)).unwrap();
    assert!(second.iter().all(|&v| v == 271.0));
}

#[test]
fn test_writer_rejects_out_of_order_and_bad_shapes() {
    let dir = temp_test_dir("forcing");
    let path = dir.path().join("out.nc");
    let mut writer = NetCdfForcingWriter::create(&path, 0).unwrap();

    assert!(writer.declare_field("t2m").is_err());

    writer.write_coordinates(&small_elements()).unwrap();
    writer.declare_field("t2m").unwrap();
    writer.declare_field("t2m").unwrap();

    let err = writer
        .write_slice("t2m", 0, &Array2D::zeros(2, 3))
        .unwrap_err();
    assert!(matches!(err, ForcingError::ShapeMismatch { .. }));

    let err = writer
        .write_slice("msl", 0, &Array2D::zeros(3, 2))
        .unwrap_err();
    assert!(matches!(err, ForcingError::UnknownField(_)));

    writer.finalize().unwrap();
    assert!(writer.finalize().is_err());
}

/// TOPAZ4-like file: packed `i16` with a singleton depth axis.
fn write_packed_source(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", 2).unwrap();
    file.add_dimension("depth", 1).unwrap();
    file.add_dimension("y", 2).unwrap();
    file.add_dimension("x", 3).unwrap();

    let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
    time.put_values(&[525_000.0, 525_024.0], ..).unwrap();

    let mut lat = file.add_variable::<f64>("latitude", &["y", "x"]).unwrap();
    lat.put_values(&[80.0, 81.0, 82.0, 83.0, 84.0, 85.0], ..)
        .unwrap();

    let mut hice = file
        .add_variable::<i16>("hice", &["time", "depth", "y", "x"])
        .unwrap();
    hice.set_fill_value(-32767i16).unwrap();
    hice.put_attribute("scale_factor", 0.01f64).unwrap();
    hice.put_attribute("add_offset", 1.0f64).unwrap();
    let raw: [i16; 12] = [0, 10, 20, 30, 40, -32767, 100, 110, 120, 130, 140, 150];
    hice.put_values(&raw, ..).unwrap();
}

#[test]
fn test_source_reader_unpacks_and_masks() {
    let dir = temp_test_dir("source");
    write_packed_source(&dir.path().join("topaz.nc"));

    let mut reader = NetCdfSourceReader::new(dir.path()).with_missing_value(-32767.0);

    let time = reader.time_axis("topaz.nc").unwrap();
    assert_eq!(time, vec![525_000.0, 525_024.0]);

    let lat = reader.coordinates("topaz.nc", "latitude").unwrap();
    assert_eq!(lat.shape(), (2, 3));
    assert_approx_eq!(lat[(1, 2)], 85.0, 1e-12);

    let first = reader.slice("topaz.nc", "hice", 0).unwrap();
    assert_eq!(first.shape(), (2, 3));
    assert_approx_eq!(first[(0, 1)], 1.1, 1e-9);
    assert_approx_eq!(first[(1, 0)], 1.3, 1e-9);
    assert_eq!(first[(1, 2)], -32767.0);

    let second = reader.slice("topaz.nc", "hice", 1).unwrap();
    assert_approx_eq!(second[(1, 2)], 2.5, 1e-9);
}

#[test]
fn test_source_reader_default_missing_is_nan() {
    let dir = temp_test_dir("source");
    write_packed_source(&dir.path().join("topaz.nc"));

    let mut reader = NetCdfSourceReader::new(dir.path());
    assert!(reader.missing_value().is_nan());
    let first = reader.slice("topaz.nc", "hice", 0).unwrap();
    assert!(first[(1, 2)].is_nan());
}

#[test]
fn test_source_reader_record_past_end() {
    let dir = temp_test_dir("source");
    write_packed_source(&dir.path().join("topaz.nc"));

    let mut reader = NetCdfSourceReader::new(dir.path());
    assert!(matches!(
        reader.slice("topaz.nc", "hice", 2),
        Err(ForcingError::DataReadError(_))
    ));
    assert!(matches!(
        reader.slice("topaz.nc", "fice", 0),
        Err(ForcingError::MissingData(_))
    ));
}

#[test]
fn test_real_era5_file() {
    let path = require_test_file!("ERA5_msl_y2010.nc");
    let dir = path.parent().expect("file has a parent directory");
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("utf-8 file name");

    let mut reader = NetCdfSourceReader::new(dir);
    let lon = reader.axis(file_name, "longitude").unwrap();
    let lat = reader.axis(file_name, "latitude").unwrap();
    let slice = reader.slice(file_name, "msl", 0).unwrap();
    assert_eq!(slice.shape(), (lat.len(), lon.len()));
    // Mean sea level pressure in Pa
    assert!(slice.iter().all(|&p| (85_000.0..110_000.0).contains(&p)));
}
