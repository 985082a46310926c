//! Naming template of persisted colocated data.
//!
//! ```text
//! <model_var>_<obs_var>_MOD-<model>_REF-<obs>_<YYYYMMDD>_<YYYYMMDD>_<ts_type>_<filter>[_<s>-<e>km].nc
//! ```

use aerocol_tstype::TsType;
use chrono::NaiveDate;

use crate::error::ColocatedDataError;

const DATE_FMT: &str = "%Y%m%d";

/// Everything encoded in a colocated-data filename.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameMeta {
    pub model_var: String,
    pub obs_var: String,
    pub model_name: String,
    pub obs_name: String,
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub ts_type: TsType,
    pub filter_name: String,
    /// Altitude band in kilometres.
    pub vertical_layer: Option<(f64, f64)>,
}

impl FilenameMeta {
    /// Filename without directory, including the `.nc` extension.
    pub fn to_filename(&self) -> String {
        let mut name = format!(
            "{}_{}_MOD-{}_REF-{}_{}_{}_{}_{}",
            self.model_var,
            self.obs_var,
            self.model_name,
            self.obs_name,
            self.start.format(DATE_FMT),
            self.stop.format(DATE_FMT),
            self.ts_type,
            self.filter_name
        );
        if let Some((s, e)) = self.vertical_layer {
            name.push_str(&format!("_{s}-{e}km"));
        }
        name.push_str(".nc");
        name
    }

    /// Parses a filename (with or without directory) produced by [`to_filename`].
    ///
    /// [`to_filename`]: FilenameMeta::to_filename
    pub fn from_filename(name: &str) -> Result<Self, ColocatedDataError> {
        let invalid = |reason: &str| ColocatedDataError::InvalidFilename {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let stem = base.strip_suffix(".nc").unwrap_or(base);

        let (vars, rest) = stem
            .split_once("_MOD-")
            .ok_or_else(|| invalid("missing '_MOD-' marker"))?;
        let (model_var, obs_var) = vars
            .split_once('_')
            .ok_or_else(|| invalid("expected '<model_var>_<obs_var>' prefix"))?;
        let (model_name, rest) = rest
            .split_once("_REF-")
            .ok_or_else(|| invalid("missing '_REF-' marker"))?;

        let mut tokens: Vec<&str> = rest.split('_').collect();
        let vertical_layer = match tokens.last() {
            Some(last) if last.ends_with("km") => {
                let layer = last.trim_end_matches("km");
                let (s, e) = layer
                    .split_once('-')
                    .ok_or_else(|| invalid("vertical layer must be '<start>-<end>km'"))?;
                let s: f64 = s.parse().map_err(|_| invalid("bad vertical layer start"))?;
                let e: f64 = e.parse().map_err(|_| invalid("bad vertical layer end"))?;
                tokens.pop();
                Some((s, e))
            }
            _ => None,
        };
        if tokens.len() < 5 {
            return Err(invalid("expected '<obs>_<start>_<stop>_<ts_type>_<filter>'"));
        }
        let n = tokens.len();
        let filter_name = tokens[n - 1].to_string();
        let ts_type: TsType = tokens[n - 2]
            .parse()
            .map_err(|_| invalid("invalid ts_type"))?;
        let parse_date = |s: &str| {
            NaiveDate::parse_from_str(s, DATE_FMT).map_err(|_| invalid("dates must be YYYYMMDD"))
        };
        let stop = parse_date(tokens[n - 3])?;
        let start = parse_date(tokens[n - 4])?;
        let obs_name = tokens[..n - 4].join("_");

        Ok(Self {
            model_var: model_var.to_string(),
            obs_var: obs_var.to_string(),
            model_name: model_name.to_string(),
            obs_name,
            start,
            stop,
            ts_type,
            filter_name,
            vertical_layer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_name() {
        let m = FilenameMeta::from_filename(
            "/out/od550aer_od550aer_MOD-ECMWF_CAMS_REAN_REF-AeronetSunV3L2_20100101_20101231_monthly_WORLD-noMOUNTAINS.nc",
        )
        .unwrap();
        assert_eq!(m.model_name, "ECMWF_CAMS_REAN");
        assert_eq!(m.obs_name, "AeronetSunV3L2");
        assert_eq!(m.filter_name, "WORLD-noMOUNTAINS");
        assert_eq!(m.ts_type.to_string(), "monthly");
        assert!(m.vertical_layer.is_none());
    }

    #[test]
    fn rejects_missing_markers() {
        assert!(FilenameMeta::from_filename("od550aer_od550aer_20100101.nc").is_err());
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(FilenameMeta::from_filename(
            "a_b_MOD-m_REF-o_2010-01-01_20101231_daily_WORLD.nc"
        )
        .is_err());
    }
}
