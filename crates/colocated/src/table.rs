//! Long-format table view of station data.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::colocated::ColocatedData;
use crate::error::ColocatedDataError;
use crate::meta::ColocationMeta;

/// One `(time, station)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub time: NaiveDateTime,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub ref_value: f64,
    pub model_value: f64,
}

/// Station data flattened to rows, plus the container metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColocatedTable {
    pub meta: ColocationMeta,
    pub rows: Vec<TableRow>,
}

impl ColocatedData {
    /// Flattens station data into one row per time step and station.
    pub fn to_table(&self) -> Result<ColocatedTable, ColocatedDataError> {
        self.require_point("to_table")?;
        let time = self.time()?;
        let names = self.station_name()?;
        let lat = self.latitude()?;
        let lon = self.longitude()?;
        let alt = self.altitude.as_deref();
        let country = self.country.as_deref();
        let mut rows = Vec::with_capacity(time.len() * names.len());
        for (t_idx, t) in time.iter().enumerate() {
            for (s_idx, name) in names.iter().enumerate() {
                rows.push(TableRow {
                    time: *t,
                    station_name: name.clone(),
                    latitude: lat[s_idx],
                    longitude: lon[s_idx],
                    altitude: alt.map(|a| a[s_idx]),
                    country: country.map(|c| c[s_idx].clone()),
                    ref_value: self.data[[0, t_idx, s_idx]],
                    model_value: self.data[[1, t_idx, s_idx]],
                });
            }
        }
        Ok(ColocatedTable {
            meta: self.meta.clone(),
            rows,
        })
    }

    /// Rebuilds station data from rows.
    ///
    /// Stations keep their order of first appearance; times are sorted.
    /// Missing `(time, station)` combinations become NaN.
    pub fn from_table(table: &ColocatedTable) -> Result<Self, ColocatedDataError> {
        let times: Vec<NaiveDateTime> = table
            .rows
            .iter()
            .map(|r| r.time)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let t_pos: HashMap<NaiveDateTime, usize> =
            times.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        let mut stations: Vec<&TableRow> = Vec::new();
        let mut s_pos: HashMap<&str, usize> = HashMap::new();
        for row in &table.rows {
            if !s_pos.contains_key(row.station_name.as_str()) {
                s_pos.insert(row.station_name.as_str(), stations.len());
                stations.push(row);
            }
        }

        let mut data = Array3::<f64>::from_elem((2, times.len(), stations.len()), f64::NAN);
        for row in &table.rows {
            let t = t_pos[&row.time];
            let s = s_pos[row.station_name.as_str()];
            data[[0, t, s]] = row.ref_value;
            data[[1, t, s]] = row.model_value;
        }

        let altitude: Option<Vec<f64>> = stations.iter().map(|r| r.altitude).collect();
        let country: Option<Vec<String>> = stations.iter().map(|r| r.country.clone()).collect();
        let out = ColocatedData::point(
            data,
            times,
            stations.iter().map(|r| r.station_name.clone()).collect(),
            stations.iter().map(|r| r.latitude).collect(),
            stations.iter().map(|r| r.longitude).collect(),
            table.meta.clone(),
        )?;
        let out = match altitude {
            Some(alt) if !alt.is_empty() => out.with_altitude(alt)?,
            _ => out,
        };
        match country {
            Some(country) if !country.is_empty() => out.with_country(country),
            _ => Ok(out),
        }
    }
}
