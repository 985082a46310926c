//! Integration tests for the CF gridded reader and the file-backed source.
//!
//! Fixtures are written programmatically so each test controls coordinate
//! order, fill values and time attributes.

use std::path::{Path, PathBuf};

use aerocol_colocate::{ColocateError, GriddedSource, ReadRequest, VertWhich};
use aerocol_io::{GriddedReaderConfig, IoError, NetcdfGriddedSource, read_gridded};
use approx::assert_relative_eq;
use chrono::NaiveDate;
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Helper: programmatic NetCDF fixture builder
// ---------------------------------------------------------------------------

/// Configuration for building a minimal gridded NetCDF fixture.
struct FixtureBuilder {
    name: String,
    lons: Vec<f64>,
    lats: Vec<f64>,
    nt: usize,
    /// Flat values in `[t, (lev,) lat, lon]` order.
    values: Vec<f64>,
    /// Level altitudes; a level axis is written when set.
    levels: Option<Vec<f64>>,
    time_units: String,
    ts_type_attr: Option<String>,
    fill_value: Option<f64>,
}

impl FixtureBuilder {
    /// Create a builder with `nt` daily steps and values `0, 1, 2, ...`.
    fn new(lons: Vec<f64>, lats: Vec<f64>, nt: usize) -> Self {
        let n = nt * lons.len() * lats.len();
        Self {
            name: "model.nc".to_string(),
            lons,
            lats,
            nt,
            values: (0..n).map(|i| i as f64).collect(),
            levels: None,
            time_units: "days since 2010-01-01".to_string(),
            ts_type_attr: None,
            fill_value: None,
        }
    }

    fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Add a level axis; values are regenerated as `0, 1, 2, ...`.
    fn with_levels(mut self, levels: Vec<f64>) -> Self {
        let n = self.nt * levels.len() * self.lons.len() * self.lats.len();
        self.values = (0..n).map(|i| i as f64).collect();
        self.levels = Some(levels);
        self
    }

    fn with_time_units(mut self, units: &str) -> Self {
        self.time_units = units.to_string();
        self
    }

    fn with_ts_type_attr(mut self, ts_type: &str) -> Self {
        self.ts_type_attr = Some(ts_type.to_string());
        self
    }

    fn with_fill_value(mut self, fv: f64) -> Self {
        self.fill_value = Some(fv);
        self
    }

    /// Write the fixture and return its path.
    fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension("time", self.nt).expect("add dim time");
        file.add_dimension("lat", self.lats.len()).expect("add dim lat");
        file.add_dimension("lon", self.lons.len()).expect("add dim lon");
        if let Some(levels) = &self.levels {
            file.add_dimension("lev", levels.len()).expect("add dim lev");
            let mut var = file
                .add_variable::<f64>("altitude", &["lev"])
                .expect("add var altitude");
            var.put_values(levels, ..).expect("put altitude values");
        }

        {
            let mut var = file.add_variable::<f64>("lon", &["lon"]).expect("add var lon");
            var.put_values(&self.lons, ..).expect("put lon values");
        }
        {
            let mut var = file.add_variable::<f64>("lat", &["lat"]).expect("add var lat");
            var.put_values(&self.lats, ..).expect("put lat values");
        }
        {
            let offsets: Vec<f64> = (0..self.nt).map(|t| t as f64).collect();
            let mut var = file.add_variable::<f64>("time", &["time"]).expect("add var time");
            var.put_values(&offsets, ..).expect("put time values");
            var.put_attribute("units", self.time_units.as_str())
                .expect("add time units");
        }
        {
            let dims: &[&str] = if self.levels.is_some() {
                &["time", "lev", "lat", "lon"]
            } else {
                &["time", "lat", "lon"]
            };
            let mut var = file
                .add_variable::<f64>("od550aer", dims)
                .expect("add var od550aer");
            var.put_attribute("units", "1").expect("add units");
            if let Some(fv) = self.fill_value {
                var.put_attribute("_FillValue", fv).expect("add _FillValue");
            }
            if let Some(ts) = &self.ts_type_attr {
                var.put_attribute("ts_type", ts.as_str()).expect("add ts_type");
            }
            var.put_values(&self.values, ..).expect("put values");
        }

        path
    }
}

fn read(path: &Path) -> Result<aerocol_colocate::GriddedData, IoError> {
    read_gridded(path, "TM5", "od550aer", &GriddedReaderConfig::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// A `(time, lat, lon)` variable becomes a single-level daily field.
#[test]
fn reads_surface_field() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![-10.0, 10.0], vec![0.0, 5.0], 4).write(dir.path());

    let field = read(&path).unwrap();
    assert_eq!(field.data().dim(), (4, 1, 2, 2));
    assert_eq!(field.ts_type().to_string(), "daily");
    assert_eq!(field.units(), Some("1"));
    assert_eq!(field.data_id(), "TM5");
    assert_eq!(
        field.time()[1],
        NaiveDate::from_ymd_opt(2010, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap()
    );
    // Flat index t=1, lat=1, lon=0 -> 1*4 + 1*2 + 0.
    assert_relative_eq!(field.data()[[1, 0, 1, 0]], 6.0);
}

/// Values equal to `_FillValue` are masked.
#[test]
fn fill_value_becomes_nan() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 3)
        .with_values(vec![1.0, -999.0, 3.0])
        .with_fill_value(-999.0)
        .write(dir.path());

    let field = read(&path).unwrap();
    assert!(field.data()[[1, 0, 0, 0]].is_nan());
    assert_relative_eq!(field.data()[[2, 0, 0, 0]], 3.0);
    assert_eq!(field.num_valid(), 2);
}

/// North-to-south latitudes are flipped together with the data.
#[test]
fn descending_latitudes_flipped() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![10.0, -10.0], 2)
        .with_values(vec![1.0, 2.0, 3.0, 4.0])
        .write(dir.path());

    let field = read(&path).unwrap();
    assert_eq!(field.latitude(), &[-10.0, 10.0]);
    assert_relative_eq!(field.data()[[0, 0, 0, 0]], 2.0);
    assert_relative_eq!(field.data()[[0, 0, 1, 0]], 1.0);
    assert_relative_eq!(field.data()[[1, 0, 0, 0]], 4.0);
}

/// Longitudes on 0..360 are moved to -180..180 and sorted.
#[test]
fn longitudes_normalised() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![90.0, 270.0], vec![0.0], 2)
        .with_values(vec![1.0, 2.0, 3.0, 4.0])
        .write(dir.path());

    let field = read(&path).unwrap();
    assert_eq!(field.longitude(), &[-90.0, 90.0]);
    assert_relative_eq!(field.data()[[0, 0, 0, 0]], 2.0);
    assert_relative_eq!(field.data()[[0, 0, 0, 1]], 1.0);
    assert_relative_eq!(field.data()[[1, 0, 0, 0]], 4.0);
}

/// A `ts_type` attribute is used when the time axis cannot be inferred.
#[test]
fn ts_type_attribute() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 1)
        .with_ts_type_attr("monthly")
        .write(dir.path());
    assert_eq!(read(&path).unwrap().ts_type().to_string(), "monthly");
}

/// One time step with no attribute and no configured ts_type fails.
#[test]
fn single_step_needs_ts_type() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 1).write(dir.path());
    assert!(matches!(read(&path), Err(IoError::InvalidTime { .. })));

    let config = GriddedReaderConfig::default().with_ts_type(Some("yearly".parse().unwrap()));
    let field = read_gridded(&path, "TM5", "od550aer", &config).unwrap();
    assert_eq!(field.ts_type().to_string(), "yearly");
}

/// Hourly offsets decode with their CF unit.
#[test]
fn hourly_time_units() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 3)
        .with_time_units("hours since 2010-01-01 00:00:00")
        .write(dir.path());
    let field = read(&path).unwrap();
    assert_eq!(field.ts_type().to_string(), "hourly");
    assert_eq!(
        field.time()[2],
        NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(2, 0, 0).unwrap()
    );
}

/// A level axis with altitudes yields a multi-level field.
#[test]
fn level_field_with_altitude() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 2)
        .with_levels(vec![10.0, 500.0, 2000.0])
        .write(dir.path());

    let field = read(&path).unwrap();
    assert_eq!(field.num_levels(), 3);
    assert_eq!(field.level_altitude(), Some(&[10.0, 500.0, 2000.0][..]));
    assert_eq!(field.nearest_level(450.0), Some(1));
    assert_relative_eq!(field.data()[[1, 2, 0, 0]], 5.0);
}

#[test]
fn missing_variable() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 2).write(dir.path());
    let err = read_gridded(&path, "TM5", "concpm10", &GriddedReaderConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::MissingVariable { .. }));
}

#[test]
fn file_not_found() {
    let err = read(Path::new("/tmp/aerocol_test_nonexistent_file.nc")).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
}

/// A variable split over yearly files is joined on read and cropped to
/// the requested period.
#[test]
fn source_joins_yearly_files() {
    let dir = tempdir().unwrap();
    FixtureBuilder::new(vec![0.0], vec![0.0], 5)
        .with_name("tm5_2010.nc")
        .write(dir.path());
    FixtureBuilder::new(vec![0.0], vec![0.0], 5)
        .with_name("tm5_2011.nc")
        .with_time_units("days since 2011-01-01")
        .write(dir.path());

    let mut source =
        NetcdfGriddedSource::from_dir("TM5", dir.path(), GriddedReaderConfig::default()).unwrap();
    assert_eq!(source.data_id(), "TM5");
    assert_eq!(source.vars_provided(), vec!["od550aer".to_string()]);
    assert_eq!(source.years_avail(), vec![2010, 2011]);
    assert!(source.ts_type().is_none());

    let all = source.read_var(&ReadRequest::new("od550aer")).unwrap();
    assert_eq!(all.time().len(), 10);

    let start = NaiveDate::from_ymd_opt(2011, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let stop = NaiveDate::from_ymd_opt(2011, 1, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let cropped = source
        .read_var(
            &ReadRequest::new("od550aer")
                .with_period(Some(start), Some(stop))
                .with_vert_which(VertWhich::Surface),
        )
        .unwrap();
    assert_eq!(cropped.time(), &[start, stop]);
    assert_relative_eq!(cropped.data()[[0, 0, 0, 0]], 1.0);
    assert_eq!(source.ts_type().map(|t| t.to_string()), Some("daily".to_string()));
}

/// Read failures surface as colocation errors through the source trait.
#[test]
fn source_missing_var_is_not_found() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![0.0], vec![0.0], 2).write(dir.path());
    let mut source =
        NetcdfGriddedSource::from_files("TM5", &[path], GriddedReaderConfig::default()).unwrap();
    let err = source.read_var(&ReadRequest::new("concpm10")).unwrap_err();
    assert!(matches!(err, ColocateError::VariableNotFound { .. }));
}
