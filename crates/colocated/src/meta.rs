//! Metadata carried by a colocated-data container.

use aerocol_resample::ResampleHow;
use aerocol_tstype::{MinNumObs, TsType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Altitude band of a profile colocation, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalLayer {
    pub start: f64,
    pub end: f64,
}

impl VerticalLayer {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// True if `altitude` lies in `[start, end)`.
    pub fn contains(&self, altitude: f64) -> bool {
        altitude >= self.start && altitude < self.end
    }
}

/// Provenance and processing settings of a colocated pair.
///
/// Index 0 of every two-element field refers to the reference (observation)
/// side, index 1 to the model side. Every field is serialised into the
/// NetCDF output as a JSON-valued attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColocationMeta {
    pub data_source: [String; 2],
    pub var_name: [String; 2],
    pub var_units: [Option<String>; 2],
    /// Resolution of the paired data.
    pub ts_type: Option<TsType>,
    /// Resolution of each input before colocation.
    pub ts_type_src: [Option<TsType>; 2],
    pub start: Option<NaiveDateTime>,
    pub stop: Option<NaiveDateTime>,
    pub filter_name: Option<String>,
    pub min_num_obs: Option<MinNumObs>,
    pub resample_how: Option<ResampleHow>,
    pub colocate_time: bool,
    pub zeros_to_nan: bool,
    pub obs_is_clim: bool,
    pub regrid_res_deg: Option<f64>,
    pub vert_code: Option<String>,
    pub vertical_layer: Option<VerticalLayer>,
}

impl ColocationMeta {
    /// Metadata with sources and variable names set.
    pub fn new(
        obs_name: impl Into<String>,
        model_name: impl Into<String>,
        obs_var: impl Into<String>,
        model_var: impl Into<String>,
    ) -> Self {
        Self {
            data_source: [obs_name.into(), model_name.into()],
            var_name: [obs_var.into(), model_var.into()],
            ..Self::default()
        }
    }

    pub fn with_ts_type(mut self, ts_type: TsType) -> Self {
        self.ts_type = Some(ts_type);
        self
    }

    pub fn with_units(mut self, obs: Option<String>, model: Option<String>) -> Self {
        self.var_units = [obs, model];
        self
    }

    pub fn with_period(mut self, start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.stop = Some(stop);
        self
    }

    pub fn with_filter_name(mut self, name: impl Into<String>) -> Self {
        self.filter_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_missing_fields() {
        let meta: ColocationMeta =
            serde_json::from_str(r#"{"var_name":["od550aer","od550aer"]}"#).unwrap();
        assert_eq!(meta.var_name[1], "od550aer");
        assert!(meta.ts_type.is_none());
        assert!(!meta.colocate_time);
    }

    #[test]
    fn layer_contains_half_open() {
        let l = VerticalLayer::new(0.0, 1000.0);
        assert!(l.contains(0.0));
        assert!(!l.contains(1000.0));
    }
}
