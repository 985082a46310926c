//! Data source interfaces.
//!
//! Readers for concrete file formats implement [`GriddedSource`] or
//! [`UngriddedSource`]; colocation dispatches on the [`ObsSource`] tag.

use std::collections::BTreeMap;

use aerocol_resample::ResampleConfig;
use aerocol_tstype::TsType;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::ColocateError;
use crate::gridded::GriddedData;
use crate::station::StationData;

/// Vertical selection applied when reading a gridded variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertWhich {
    /// Lowest level only.
    #[default]
    Surface,
    /// One model level by index.
    Level(usize),
    /// All levels, the one nearest each station's altitude is picked later.
    StationAltitude,
    /// All levels.
    All,
}

/// Parameters of [`GriddedSource::read_var`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub var_name: String,
    pub start: Option<NaiveDateTime>,
    pub stop: Option<NaiveDateTime>,
    /// Requested resolution; `None` keeps the stored one.
    pub ts_type: Option<TsType>,
    pub vert_which: VertWhich,
    /// Accept a coarser stored resolution if `ts_type` cannot be produced.
    pub flex_ts_type: bool,
}

impl ReadRequest {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            start: None,
            stop: None,
            ts_type: None,
            vert_which: VertWhich::Surface,
            flex_ts_type: true,
        }
    }

    pub fn with_period(mut self, start: Option<NaiveDateTime>, stop: Option<NaiveDateTime>) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    pub fn with_ts_type(mut self, ts_type: Option<TsType>) -> Self {
        self.ts_type = ts_type;
        self
    }

    pub fn with_vert_which(mut self, vert_which: VertWhich) -> Self {
        self.vert_which = vert_which;
        self
    }

    pub fn with_flex_ts_type(mut self, flex: bool) -> Self {
        self.flex_ts_type = flex;
        self
    }
}

/// A provider of gridded variables.
pub trait GriddedSource {
    /// Identifier used in metadata and filenames.
    fn data_id(&self) -> &str;

    /// Variables this source can read.
    fn vars_provided(&self) -> Vec<String>;

    /// Years with data for any variable.
    fn years_avail(&self) -> Vec<i32>;

    /// Resolution of the last successful read.
    fn ts_type(&self) -> Option<TsType>;

    fn read_var(&mut self, request: &ReadRequest) -> Result<GriddedData, ColocateError>;

    fn has_var(&self, var_name: &str) -> bool {
        self.vars_provided().iter().any(|v| v == var_name)
    }
}

/// A provider of station observations.
pub trait UngriddedSource {
    /// Datasets (networks) contained.
    fn contains_datasets(&self) -> Vec<String>;

    /// Variables available at any station.
    fn contains_vars(&self) -> Vec<String>;

    /// Stations with at least one of `vars`, restricted to those variables.
    fn read(&mut self, vars: &[String]) -> Result<Vec<StationData>, ColocateError>;
}

/// Observation side of a colocation.
pub enum ObsSource {
    Gridded(Box<dyn GriddedSource>),
    Ungridded(Box<dyn UngriddedSource>),
}

impl ObsSource {
    pub fn is_gridded(&self) -> bool {
        matches!(self, ObsSource::Gridded(_))
    }

    /// Name used in metadata: the data id, or the single dataset name.
    pub fn name(&self) -> String {
        match self {
            ObsSource::Gridded(s) => s.data_id().to_string(),
            ObsSource::Ungridded(s) => s.contains_datasets().join(","),
        }
    }

    pub fn has_var(&self, var_name: &str) -> bool {
        match self {
            ObsSource::Gridded(s) => s.has_var(var_name),
            ObsSource::Ungridded(s) => s.contains_vars().iter().any(|v| v == var_name),
        }
    }
}

impl std::fmt::Debug for ObsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObsSource::Gridded(s) => write!(f, "ObsSource::Gridded({})", s.data_id()),
            ObsSource::Ungridded(s) => {
                write!(f, "ObsSource::Ungridded({:?})", s.contains_datasets())
            }
        }
    }
}

// ----- In-memory sources -----

/// Gridded source backed by fields held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGridded {
    data_id: String,
    fields: BTreeMap<String, GriddedData>,
    last_ts_type: Option<TsType>,
}

impl InMemoryGridded {
    pub fn new(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: GriddedData) -> Self {
        self.fields.insert(field.var_name().to_string(), field);
        self
    }
}

/// Applies a [`ReadRequest`] to a stored field.
///
/// Shared by in-memory and file-backed sources.
pub fn apply_read_request(
    field: &GriddedData,
    request: &ReadRequest,
) -> Result<GriddedData, ColocateError> {
    let mut out = match field.time_range() {
        Some((first, last)) => {
            field.crop_time(request.start.unwrap_or(first), request.stop.unwrap_or(last))
        }
        None => field.clone(),
    };
    out = match request.vert_which {
        VertWhich::Surface => out.select_level(0)?,
        VertWhich::Level(l) => out.select_level(l)?,
        VertWhich::StationAltitude | VertWhich::All => out,
    };
    if let Some(to) = request.ts_type {
        if to > out.ts_type() {
            if !request.flex_ts_type {
                return Err(ColocateError::Read {
                    source_name: field.data_id().to_string(),
                    reason: format!(
                        "'{}' is only available at '{}', finer than stored",
                        request.var_name,
                        out.ts_type()
                    ),
                });
            }
            debug!(requested = %to, stored = %out.ts_type(), "flexible ts_type, keeping stored resolution");
        } else if to != out.ts_type() {
            out = out.resample_time(to, &ResampleConfig::new())?;
        }
    }
    Ok(out)
}

impl GriddedSource for InMemoryGridded {
    fn data_id(&self) -> &str {
        &self.data_id
    }

    fn vars_provided(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn years_avail(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.fields.values().flat_map(|f| f.years_avail()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    fn ts_type(&self) -> Option<TsType> {
        self.last_ts_type
    }

    fn read_var(&mut self, request: &ReadRequest) -> Result<GriddedData, ColocateError> {
        let field = self
            .fields
            .get(&request.var_name)
            .ok_or_else(|| ColocateError::VariableNotFound {
                var_name: request.var_name.clone(),
                source_name: self.data_id.clone(),
            })?;
        let out = apply_read_request(field, request)?;
        self.last_ts_type = Some(out.ts_type());
        Ok(out)
    }
}

/// Station source backed by records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUngridded {
    stations: Vec<StationData>,
}

impl InMemoryUngridded {
    pub fn new(stations: Vec<StationData>) -> Self {
        Self { stations }
    }
}

/// Restricts stations to `vars`, dropping stations left without data.
pub fn select_station_vars(stations: &[StationData], vars: &[String]) -> Vec<StationData> {
    stations
        .iter()
        .filter(|s| vars.iter().any(|v| s.has_var(v)))
        .map(|s| {
            let mut s = s.clone();
            s.series.retain(|k, _| vars.contains(k));
            s.profiles.retain(|k, _| vars.contains(k));
            s.units.retain(|k, _| vars.contains(k));
            s
        })
        .collect()
}

impl UngriddedSource for InMemoryUngridded {
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
            .flat_map(|s| s.series.keys().chain(s.profiles.keys()).cloned())
            .collect();
        vars.sort();
        vars.dedup();
        vars
    }

    fn read(&mut self, vars: &[String]) -> Result<Vec<StationData>, ColocateError> {
        Ok(select_station_vars(&self.stations, vars))
    }
}
