//! CF gridded NetCDF reader and the file-backed gridded source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aerocol_colocate::{
    ColocateError, GriddedData, GriddedSource, ReadRequest, apply_read_request,
};
use aerocol_tstype::TsType;
use chrono::{Datelike, NaiveDateTime};
use ndarray::{Array4, Axis, concatenate};
use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::netcdf_read;

// ---------------------------------------------------------------------------
// GriddedReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading gridded fields from CF NetCDF files.
///
/// Data variables are laid out `(time, lat, lon)` or
/// `(time, lev, lat, lon)`. Coordinates are looked up through alias lists.
#[derive(Debug, Clone)]
pub struct GriddedReaderConfig {
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases of the 1-D level altitude coordinate (metres).
    level_altitude_aliases: Vec<String>,
    /// NetCDF variable name for the time axis.
    time_var: String,
    /// Resolution to assume instead of the attribute or inferred one.
    ts_type: Option<TsType>,
}

impl Default for GriddedReaderConfig {
    fn default() -> Self {
        Self {
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            level_altitude_aliases: vec!["altitude".into(), "z".into()],
            time_var: "time".into(),
            ts_type: None,
        }
    }
}

impl GriddedReaderConfig {
    /// Set the longitude aliases.
    pub fn with_lon_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lon_aliases = aliases;
        self
    }

    /// Set the latitude aliases.
    pub fn with_lat_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lat_aliases = aliases;
        self
    }

    /// Set the level altitude aliases.
    pub fn with_level_altitude_aliases(mut self, aliases: Vec<String>) -> Self {
        self.level_altitude_aliases = aliases;
        self
    }

    /// Set the time variable name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    /// Force the resolution of every field read.
    pub fn with_ts_type(mut self, ts_type: Option<TsType>) -> Self {
        self.ts_type = ts_type;
        self
    }

    // --- Accessors ---

    pub fn lon_aliases(&self) -> &[String] {
        &self.lon_aliases
    }

    pub fn lat_aliases(&self) -> &[String] {
        &self.lat_aliases
    }

    pub fn level_altitude_aliases(&self) -> &[String] {
        &self.level_altitude_aliases
    }

    pub fn time_var(&self) -> &str {
        &self.time_var
    }

    pub fn ts_type(&self) -> Option<TsType> {
        self.ts_type
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Whether `var` is a gridded data variable: time first, then 2 or 3 axes.
fn is_gridded_var(var: &netcdf::Variable<'_>, config: &GriddedReaderConfig) -> bool {
    let dims = netcdf_read::dimension_names(var);
    (dims.len() == 3 || dims.len() == 4) && dims[0] == config.time_var
}

fn resolve_ts_type(
    file: &netcdf::File,
    var: &netcdf::Variable<'_>,
    time: &[NaiveDateTime],
    config: &GriddedReaderConfig,
) -> Result<TsType, IoError> {
    if let Some(ts) = config.ts_type {
        return Ok(ts);
    }
    let attr = match netcdf_read::var_string(var, "ts_type") {
        Some(s) => Some(s),
        None => netcdf_read::global_string(file, "ts_type")?,
    };
    match attr {
        Some(s) => Ok(s.parse()?),
        None => netcdf_read::infer_ts_type(time),
    }
}

/// Read one gridded variable from a CF NetCDF file.
///
/// Latitudes are flipped to ascending order and longitudes normalised to
/// `[-180, 180)` and sorted. `_FillValue`/`missing_value` become NaN. The
/// resolution comes from the config, a `ts_type` attribute on the variable
/// or the file, or the median time step, in that order.
pub fn read_gridded(
    path: &Path,
    data_id: &str,
    var_name: &str,
    config: &GriddedReaderConfig,
) -> Result<GriddedData, IoError> {
    let file = netcdf_read::open_file(path)?;
    let var = file
        .variable(var_name)
        .ok_or_else(|| IoError::MissingVariable {
            name: var_name.to_string(),
            path: path.to_path_buf(),
        })?;

    let dims = var.dimensions();
    if dims.len() != 3 && dims.len() != 4 {
        return Err(IoError::DimensionMismatch {
            name: format!("{var_name} dimensions"),
            expected: 3,
            got: dims.len(),
        });
    }
    let nt = dims[0].len();
    let (nlev, nlat, nlon) = if dims.len() == 4 {
        (dims[1].len(), dims[2].len(), dims[3].len())
    } else {
        (1, dims[1].len(), dims[2].len())
    };

    // -- Coordinates ---
    let time = netcdf_read::read_time(&file, &config.time_var, path)?;
    let mut lat = netcdf_read::read_1d_f64(&file, &config.lat_aliases, path)?;
    let mut lon = netcdf_read::read_1d_f64(&file, &config.lon_aliases, path)?;
    for (name, expected, got) in [
        ("time", nt, time.len()),
        ("lat", nlat, lat.len()),
        ("lon", nlon, lon.len()),
    ] {
        if expected != got {
            return Err(IoError::DimensionMismatch {
                name: name.to_string(),
                expected,
                got,
            });
        }
    }
    let level_altitude = if dims.len() == 4 {
        match netcdf_read::find_variable(&file, &config.level_altitude_aliases) {
            Some(v) => {
                let alt = v.get_values::<f64, _>(..)?;
                if alt.len() != nlev {
                    return Err(IoError::DimensionMismatch {
                        name: "level altitude".to_string(),
                        expected: nlev,
                        got: alt.len(),
                    });
                }
                Some(alt)
            }
            None => None,
        }
    } else {
        None
    };

    // -- Values ---
    let values = netcdf_read::read_masked(&var)?;
    let mut data = Array4::from_shape_vec((nt, nlev, nlat, nlon), values)
        .map_err(ColocateError::from)?;

    if lat.len() > 1 && lat[0] > lat[lat.len() - 1] {
        lat.reverse();
        data.invert_axis(Axis(2));
        debug!(var = var_name, "flipped descending latitudes");
    }

    for l in lon.iter_mut() {
        if *l >= 180.0 {
            *l -= 360.0;
        }
    }
    let mut order: Vec<usize> = (0..lon.len()).collect();
    order.sort_by(|a, b| lon[*a].total_cmp(&lon[*b]));
    if order.iter().enumerate().any(|(i, j)| i != *j) {
        lon = order.iter().map(|&i| lon[i]).collect();
        data = data.select(Axis(3), &order);
        debug!(var = var_name, "reordered longitudes to [-180, 180)");
    } else {
        data = data.as_standard_layout().into_owned();
    }

    let ts_type = resolve_ts_type(&file, &var, &time, config)?;
    let units = netcdf_read::var_string(&var, "units");

    let mut field = GriddedData::with_levels(
        data_id,
        var_name,
        ts_type,
        time,
        lat,
        lon,
        data,
        level_altitude,
    )?;
    if let Some(u) = units {
        field = field.with_units(u);
    }
    info!(
        path = %path.display(),
        var = var_name,
        %ts_type,
        shape = ?field.data().dim(),
        "read gridded field"
    );
    Ok(field)
}

/// Joins fields of one variable split over several files along time.
///
/// Parts must share grid and levels; they are ordered by first time step.
pub fn concat_time(mut parts: Vec<GriddedData>) -> Result<GriddedData, IoError> {
    parts.sort_by_key(|p| p.time().first().copied());
    if parts.len() == 1 {
        return Ok(parts.swap_remove(0));
    }
    let Some(first) = parts.first() else {
        return Err(IoError::InvalidTime {
            reason: "no fields to concatenate".to_string(),
        });
    };
    for p in &parts[1..] {
        if p.latitude() != first.latitude()
            || p.longitude() != first.longitude()
            || p.num_levels() != first.num_levels()
        {
            return Err(ColocateError::DataDimension {
                reason: format!("files of '{}' use different grids", first.var_name()),
            }
            .into());
        }
    }
    let time: Vec<NaiveDateTime> = parts.iter().flat_map(|p| p.time().iter().copied()).collect();
    let views: Vec<_> = parts.iter().map(|p| p.data().view()).collect();
    let data = concatenate(Axis(0), &views).map_err(ColocateError::from)?;
    let mut joined = GriddedData::with_levels(
        first.data_id(),
        first.var_name(),
        first.ts_type(),
        time,
        first.latitude().to_vec(),
        first.longitude().to_vec(),
        data,
        first.level_altitude().map(<[f64]>::to_vec),
    )?;
    if let Some(u) = first.units() {
        joined = joined.with_units(u);
    }
    Ok(joined)
}

// ---------------------------------------------------------------------------
// NetcdfGriddedSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FileEntry {
    path: PathBuf,
    years: Vec<i32>,
}

/// Gridded source backed by a set of CF NetCDF files.
///
/// Files are scanned once on construction; a variable may be spread over
/// several files (one per year, say), which are joined on read.
#[derive(Debug, Clone)]
pub struct NetcdfGriddedSource {
    data_id: String,
    config: GriddedReaderConfig,
    vars: BTreeMap<String, Vec<FileEntry>>,
    last_ts_type: Option<TsType>,
}

impl NetcdfGriddedSource {
    /// Scan `paths` for gridded variables.
    pub fn from_files(
        data_id: impl Into<String>,
        paths: &[PathBuf],
        config: GriddedReaderConfig,
    ) -> Result<Self, IoError> {
        let mut vars: BTreeMap<String, Vec<FileEntry>> = BTreeMap::new();
        for path in paths {
            let file = netcdf_read::open_file(path)?;
            let names: Vec<String> = file
                .variables()
                .filter(|v| is_gridded_var(v, &config))
                .map(|v| v.name())
                .collect();
            if names.is_empty() {
                warn!(path = %path.display(), "no gridded variables in file");
                continue;
            }
            let time = netcdf_read::read_time(&file, &config.time_var, path)?;
            let mut years: Vec<i32> = time.iter().map(|t| t.year()).collect();
            years.dedup();
            for name in names {
                vars.entry(name).or_default().push(FileEntry {
                    path: path.clone(),
                    years: years.clone(),
                });
            }
        }
        let data_id = data_id.into();
        info!(data_id = %data_id, files = paths.len(), vars = vars.len(), "scanned gridded files");
        Ok(Self {
            data_id,
            config,
            vars,
            last_ts_type: None,
        })
    }

    /// Scan every `*.nc` file in `dir`.
    pub fn from_dir(
        data_id: impl Into<String>,
        dir: &Path,
        config: GriddedReaderConfig,
    ) -> Result<Self, IoError> {
        if !dir.exists() {
            return Err(IoError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "nc") {
                paths.push(path);
            }
        }
        paths.sort();
        Self::from_files(data_id, &paths, config)
    }

    fn read_field(&self, request: &ReadRequest) -> Result<GriddedData, IoError> {
        let entries = self
            .vars
            .get(&request.var_name)
            .ok_or_else(|| ColocateError::VariableNotFound {
                var_name: request.var_name.clone(),
                source_name: self.data_id.clone(),
            })?;
        let wanted = |e: &&FileEntry| {
            let start_ok = request
                .start
                .is_none_or(|s| e.years.last().is_some_and(|y| *y >= s.year()));
            let stop_ok = request
                .stop
                .is_none_or(|s| e.years.first().is_some_and(|y| *y <= s.year()));
            start_ok && stop_ok
        };
        let mut selected: Vec<&FileEntry> = entries.iter().filter(wanted).collect();
        if selected.is_empty() {
            debug!(var = %request.var_name, "no file inside requested period, reading all");
            selected = entries.iter().collect();
        }
        let parts = selected
            .iter()
            .map(|e| read_gridded(&e.path, &self.data_id, &request.var_name, &self.config))
            .collect::<Result<Vec<_>, _>>()?;
        let field = concat_time(parts)?;
        Ok(apply_read_request(&field, request)?)
    }
}

impl GriddedSource for NetcdfGriddedSource {
    fn data_id(&self) -> &str {
        &self.data_id
    }

    fn vars_provided(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    fn years_avail(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .vars
            .values()
            .flatten()
            .flat_map(|e| e.years.iter().copied())
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    fn ts_type(&self) -> Option<TsType> {
        self.last_ts_type
    }

    fn read_var(&mut self, request: &ReadRequest) -> Result<GriddedData, ColocateError> {
        let field = self
            .read_field(request)
            .map_err(|e| e.into_colocate(&self.data_id))?;
        self.last_ts_type = Some(field.ts_type());
        Ok(field)
    }
}
