//! NetCDF persistence of colocated data.
//!
//! The paired array is stored as one variable named after the reference
//! variable, with dimensions `(data_source, time, station_name)` or
//! `(data_source, time, latitude, longitude)`. Metadata, station names and
//! countries are stored as JSON-valued global attributes.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ndarray::{ArrayD, Ix3, Ix4, IxDyn};
use tracing::{debug, info};

use crate::cf_time::{CF_TIME_UNITS, decode_cf_times, encode_cf_times, parse_cf_time_units};
use crate::colocated::{ColocatedData, Layout};
use crate::error::ColocatedDataError;
use crate::filename::FilenameMeta;
use crate::meta::ColocationMeta;

const META_ATTR: &str = "aerocol_meta";
const STATION_ATTR: &str = "station_name";
const COUNTRY_ATTR: &str = "country";
const DEFAULT_FILTER: &str = "WORLD";

/// Parses the metadata encoded in the filename of a colocated-data file.
pub fn get_meta_from_filename(path: &Path) -> Result<FilenameMeta, ColocatedDataError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    FilenameMeta::from_filename(name)
}

impl ColocatedData {
    /// Filename fields derived from metadata and the time coordinate.
    pub fn filename_meta(&self) -> Result<FilenameMeta, ColocatedDataError> {
        let [obs_name, model_name] = self.data_source()?.clone();
        let [obs_var, model_var] = self.var_name()?.clone();
        let time = self.time()?;
        let start = self
            .meta
            .start
            .or_else(|| time.first().copied())
            .ok_or(ColocatedDataError::MissingAttribute { name: "start" })?;
        let stop = self
            .meta
            .stop
            .or_else(|| time.last().copied())
            .ok_or(ColocatedDataError::MissingAttribute { name: "stop" })?;
        Ok(FilenameMeta {
            model_var,
            obs_var,
            model_name,
            obs_name,
            start: start.date(),
            stop: stop.date(),
            ts_type: self.ts_type()?,
            filter_name: self
                .meta
                .filter_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            vertical_layer: self
                .meta
                .vertical_layer
                .map(|l| (l.start / 1000.0, l.end / 1000.0)),
        })
    }

    /// Default filename of this container.
    pub fn savename(&self) -> Result<String, ColocatedDataError> {
        Ok(self.filename_meta()?.to_filename())
    }

    /// Writes the container into `dir` under [`savename`](Self::savename).
    pub fn to_netcdf(&self, dir: &Path) -> Result<PathBuf, ColocatedDataError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.savename()?);
        self.to_netcdf_path(&path)?;
        Ok(path)
    }

    /// Writes the container to an explicit path.
    pub fn to_netcdf_path(&self, path: &Path) -> Result<(), ColocatedDataError> {
        let mut file = netcdf::create(path)?;
        let shape = self.shape().to_vec();

        file.add_dimension("data_source", 2)?;
        file.add_dimension("time", shape[1])?;
        let data_dims: Vec<&str> = match self.layout() {
            Layout::Point => {
                file.add_dimension("station_name", shape[2])?;
                vec!["data_source", "time", "station_name"]
            }
            Layout::Grid => {
                file.add_dimension("latitude", shape[2])?;
                file.add_dimension("longitude", shape[3])?;
                vec!["data_source", "time", "latitude", "longitude"]
            }
        };

        file.add_attribute("Conventions", "CF-1.6")?;
        file.add_attribute(META_ATTR, serde_json::to_string(&self.meta)?.as_str())?;
        if let Some(names) = &self.station_name {
            file.add_attribute(STATION_ATTR, serde_json::to_string(names)?.as_str())?;
        }
        if let Some(country) = &self.country {
            file.add_attribute(COUNTRY_ATTR, serde_json::to_string(country)?.as_str())?;
        }

        if let Some(time) = &self.time {
            let mut var = file.add_variable::<f64>("time", &["time"])?;
            var.put_values(&encode_cf_times(time), ..)?;
            var.put_attribute("units", CF_TIME_UNITS)?;
            var.put_attribute("standard_name", "time")?;
        }
        let (lat_dim, lon_dim) = match self.layout() {
            Layout::Point => ("station_name", "station_name"),
            Layout::Grid => ("latitude", "longitude"),
        };
        for (name, dim, values, units) in [
            ("latitude", lat_dim, &self.latitude, "degrees_north"),
            ("longitude", lon_dim, &self.longitude, "degrees_east"),
            ("altitude", "station_name", &self.altitude, "m"),
        ] {
            if let Some(values) = values {
                let mut var = file.add_variable::<f64>(name, &[dim])?;
                var.put_values(values, ..)?;
                var.put_attribute("units", units)?;
            }
        }

        let var_name = data_var_name(&self.meta);
        let mut var = file.add_variable::<f64>(&var_name, &data_dims)?;
        let values: Vec<f64> = self.data.iter().copied().collect();
        var.put_values(&values, ..)?;
        if let Some(units) = &self.meta.var_units[0] {
            var.put_attribute("units", units.as_str())?;
        }
        if let Some(ts_type) = &self.meta.ts_type {
            var.put_attribute("ts_type", ts_type.to_string().as_str())?;
        }

        info!(path = %path.display(), shape = ?shape, "wrote colocated data");
        Ok(())
    }

    /// Reads a file written by [`to_netcdf`](Self::to_netcdf).
    pub fn read_netcdf(path: &Path) -> Result<Self, ColocatedDataError> {
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
            .into());
        }
        let file = netcdf::open(path)?;
        let var = file
            .variables()
            .find(|v| {
                v.dimensions()
                    .first()
                    .is_some_and(|d| d.name() == "data_source")
            })
            .ok_or_else(|| ColocatedDataError::MissingVariable {
                name: "(data_source, time, ...)".to_string(),
                path: path.to_path_buf(),
            })?;
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), var.get_values::<f64, _>(..)?)?;

        let meta = match string_attribute(&file, META_ATTR)? {
            Some(json) => serde_json::from_str(&json)?,
            None => {
                let name = var.name();
                ColocationMeta {
                    var_name: [name.clone(), name],
                    ..ColocationMeta::default()
                }
            }
        };
        let time = read_time(&file, path)?;
        let latitude = read_required(&file, "latitude", path)?;
        let longitude = read_required(&file, "longitude", path)?;

        let out = match shape.len() {
            3 => {
                let names: Vec<String> = match string_attribute(&file, STATION_ATTR)? {
                    Some(json) => serde_json::from_str(&json)?,
                    None => {
                        return Err(ColocatedDataError::MissingVariable {
                            name: STATION_ATTR.to_string(),
                            path: path.to_path_buf(),
                        });
                    }
                };
                let mut cd = ColocatedData::point(
                    data.into_dimensionality::<Ix3>()?,
                    time,
                    names,
                    latitude,
                    longitude,
                    meta,
                )?;
                if let Some(alt) = read_optional(&file, "altitude")? {
                    cd = cd.with_altitude(alt)?;
                }
                if let Some(json) = string_attribute(&file, COUNTRY_ATTR)? {
                    cd = cd.with_country(serde_json::from_str(&json)?)?;
                }
                cd
            }
            _ => ColocatedData::grid(
                data.into_dimensionality::<Ix4>()?,
                time,
                latitude,
                longitude,
                meta,
            )?,
        };
        debug!(path = %path.display(), layout = %out.layout(), "read colocated data");
        Ok(out)
    }
}

fn data_var_name(meta: &ColocationMeta) -> String {
    if meta.var_name[0].is_empty() {
        "data".to_string()
    } else {
        meta.var_name[0].clone()
    }
}

fn string_attribute(file: &netcdf::File, name: &str) -> Result<Option<String>, ColocatedDataError> {
    let Some(attr) = file.attribute(name) else {
        return Ok(None);
    };
    let value: String = attr
        .value()?
        .try_into()
        .map_err(|e: netcdf::Error| ColocatedDataError::Serialization {
            reason: format!("attribute '{name}' is not a string: {e}"),
        })?;
    Ok(Some(value))
}

fn read_optional(file: &netcdf::File, name: &str) -> Result<Option<Vec<f64>>, ColocatedDataError> {
    match file.variable(name) {
        Some(var) => Ok(Some(var.get_values::<f64, _>(..)?)),
        None => Ok(None),
    }
}

fn read_required(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<f64>, ColocatedDataError> {
    read_optional(file, name)?.ok_or_else(|| ColocatedDataError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

fn read_time(file: &netcdf::File, path: &Path) -> Result<Vec<NaiveDateTime>, ColocatedDataError> {
    let var = file
        .variable("time")
        .ok_or_else(|| ColocatedDataError::MissingVariable {
            name: "time".to_string(),
            path: path.to_path_buf(),
        })?;
    let units: String = var
        .attribute_value("units")
        .ok_or_else(|| ColocatedDataError::InvalidTime {
            reason: "time variable has no 'units' attribute".to_string(),
        })??
        .try_into()
        .map_err(|e: netcdf::Error| ColocatedDataError::InvalidTime {
            reason: format!("'units' attribute is not a string: {e}"),
        })?;
    let units = parse_cf_time_units(&units)?;
    decode_cf_times(&var.get_values::<f64, _>(..)?, &units)
}
