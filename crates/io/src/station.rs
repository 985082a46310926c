//! Station observation reader and the file-backed ungridded source.
//!
//! A station file holds one dataset. Data variables are laid out
//! `(station, time)`; station names and countries are JSON lists in the
//! global attributes `station_name` and `country`.

use std::path::{Path, PathBuf};

use aerocol_colocate::{ColocateError, StationData, UngriddedSource, select_station_vars};
use aerocol_resample::TimeSeries;
use aerocol_tstype::TsType;
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;

/// Configuration for reading station files.
#[derive(Debug, Clone)]
pub struct StationReaderConfig {
    station_dim: String,
    time_var: String,
    lon_aliases: Vec<String>,
    lat_aliases: Vec<String>,
    altitude_aliases: Vec<String>,
    /// Dataset name used when the file has no `dataset` attribute.
    dataset: Option<String>,
    /// Resolution used when the file has no `ts_type` attribute.
    ts_type: Option<TsType>,
}

impl Default for StationReaderConfig {
    fn default() -> Self {
        Self {
            station_dim: "station".into(),
            time_var: "time".into(),
            lon_aliases: vec!["lon".into(), "longitude".into()],
            lat_aliases: vec!["lat".into(), "latitude".into()],
            altitude_aliases: vec!["altitude".into(), "station_altitude".into(), "alt".into()],
            dataset: None,
            ts_type: None,
        }
    }
}

impl StationReaderConfig {
    pub fn with_station_dim(mut self, name: impl Into<String>) -> Self {
        self.station_dim = name.into();
        self
    }

    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    pub fn with_dataset(mut self, dataset: Option<String>) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_ts_type(mut self, ts_type: Option<TsType>) -> Self {
        self.ts_type = ts_type;
        self
    }

    // --- Accessors ---

    pub fn station_dim(&self) -> &str {
        &self.station_dim
    }

    pub fn time_var(&self) -> &str {
        &self.time_var
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    pub fn ts_type(&self) -> Option<TsType> {
        self.ts_type
    }
}

fn check_len(name: &str, expected: usize, got: usize) -> Result<(), IoError> {
    if expected != got {
        return Err(IoError::DimensionMismatch {
            name: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Read every station of a station file.
///
/// Stations keep only variables with at least one valid value; stations
/// left with none are dropped.
pub fn read_stations(path: &Path, config: &StationReaderConfig) -> Result<Vec<StationData>, IoError> {
    let file = netcdf_read::open_file(path)?;
    let ns = file
        .dimension(&config.station_dim)
        .map(|d| d.len())
        .ok_or_else(|| IoError::MissingVariable {
            name: config.station_dim.clone(),
            path: path.to_path_buf(),
        })?;

    // -- Coordinates ---
    let time = netcdf_read::read_time(&file, &config.time_var, path)?;
    let lat = netcdf_read::read_1d_f64(&file, &config.lat_aliases, path)?;
    let lon = netcdf_read::read_1d_f64(&file, &config.lon_aliases, path)?;
    check_len("lat", ns, lat.len())?;
    check_len("lon", ns, lon.len())?;
    let altitude = match netcdf_read::find_variable(&file, &config.altitude_aliases) {
        Some(v) => {
            let alt = v.get_values::<f64, _>(..)?;
            check_len("altitude", ns, alt.len())?;
            alt
        }
        None => vec![f64::NAN; ns],
    };

    // -- Metadata ---
    let names = netcdf_read::global_json_list(&file, "station_name")?
        .unwrap_or_else(|| (0..ns).map(|i| format!("station_{i}")).collect());
    check_len("station_name", ns, names.len())?;
    let countries = netcdf_read::global_json_list(&file, "country")?;
    if let Some(c) = &countries {
        check_len("country", ns, c.len())?;
    }
    let dataset = match &config.dataset {
        Some(d) => d.clone(),
        None => match netcdf_read::global_string(&file, "dataset")? {
            Some(d) => d,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        },
    };
    let ts_type = match config.ts_type {
        Some(ts) => ts,
        None => match netcdf_read::global_string(&file, "ts_type")? {
            Some(s) => s.parse()?,
            None => netcdf_read::infer_ts_type(&time)?,
        },
    };

    let mut stations: Vec<StationData> = (0..ns)
        .map(|i| {
            let s = StationData::new(&names[i], lat[i], lon[i], altitude[i], &dataset, ts_type);
            match &countries {
                Some(c) => s.with_country(&c[i]),
                None => s,
            }
        })
        .collect();

    // -- Data variables ---
    let nt = time.len();
    let layout = [config.station_dim.clone(), config.time_var.clone()];
    for var in file.variables() {
        if netcdf_read::dimension_names(&var) != layout {
            continue;
        }
        let name = var.name();
        let units = netcdf_read::var_string(&var, "units");
        let values = netcdf_read::read_masked(&var)?;
        check_len(&name, ns * nt, values.len())?;
        for (station, row) in stations.iter_mut().zip(values.chunks(nt.max(1))) {
            if row.iter().all(|v| v.is_nan()) {
                continue;
            }
            let series = TimeSeries::new(time.clone(), row.to_vec())?;
            station.series.insert(name.clone(), series);
            if let Some(u) = &units {
                station.units.insert(name.clone(), u.clone());
            }
        }
        debug!(var = %name, "read station variable");
    }

    stations.retain(|s| !s.series.is_empty());
    info!(
        path = %path.display(),
        dataset = %dataset,
        %ts_type,
        stations = stations.len(),
        "read station file"
    );
    Ok(stations)
}

/// Ungridded source backed by station files, loaded on construction.
#[derive(Debug, Clone, Default)]
pub struct NetcdfUngriddedSource {
    stations: Vec<StationData>,
}

impl NetcdfUngriddedSource {
    pub fn from_files(paths: &[PathBuf], config: &StationReaderConfig) -> Result<Self, IoError> {
        let mut stations = Vec::new();
        for path in paths {
            stations.extend(read_stations(path, config)?);
        }
        Ok(Self { stations })
    }

    pub fn stations(&self) -> &[StationData] {
        &self.stations
    }
}

impl UngriddedSource for NetcdfUngriddedSource {
    fn contains_datasets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stations.iter().map(|s| s.dataset.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    fn contains_vars(&self) -> Vec<String> {
        let mut vars: Vec<String> = self
            .stations
            .iter()
            .flat_map(|s| s.series.keys().cloned())
            .collect();
        vars.sort();
        vars.dedup();
        vars
    }

    fn read(&mut self, vars: &[String]) -> Result<Vec<StationData>, ColocateError> {
        Ok(select_station_vars(&self.stations, vars))
    }
}
