//! Batch colocation setup composed of option groups.

use std::collections::BTreeMap;

use aerocol_colocated::Region;
use aerocol_resample::ResampleHow;
use aerocol_tstype::{MinNumObs, TsType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ColocateError;
use crate::extract::Extraction;
use crate::options::{ClimatologyOptions, ColocationOptions};
use crate::source::VertWhich;

/// A model variable and the observation variable it is compared to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarPair {
    pub model_var: String,
    pub obs_var: String,
}

impl VarPair {
    pub fn new(model_var: impl Into<String>, obs_var: impl Into<String>) -> Self {
        Self {
            model_var: model_var.into(),
            obs_var: obs_var.into(),
        }
    }
}

/// Period and resolution settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeOptions {
    pub start: Option<NaiveDateTime>,
    pub stop: Option<NaiveDateTime>,
    pub ts_type: Option<TsType>,
    /// Accept a coarser model resolution than requested.
    pub flex_ts_type: bool,
    pub colocate_time: bool,
    /// Compare against a monthly observation climatology.
    pub climatology: Option<ClimatologyOptions>,
}

impl TimeOptions {
    pub fn new() -> Self {
        Self {
            flex_ts_type: true,
            ..Self::default()
        }
    }
}

/// Region and value filters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub filter_name: String,
    pub region: Option<Region>,
    pub remove_outliers: bool,
    pub model_remove_outliers: bool,
    /// Valid `(low, high)` range per variable name.
    pub var_outlier_ranges: BTreeMap<String, (f64, f64)>,
    pub zeros_to_nan: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            filter_name: "WORLD".to_string(),
            region: None,
            remove_outliers: true,
            model_remove_outliers: false,
            var_outlier_ranges: BTreeMap::new(),
            zeros_to_nan: false,
        }
    }
}

/// Coverage and aggregation rules, global and per observation variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampleOptions {
    pub min_num_obs: MinNumObs,
    pub resample_how: ResampleHow,
    pub var_min_num_obs: BTreeMap<String, MinNumObs>,
    pub var_resample_how: BTreeMap<String, ResampleHow>,
}

/// Spatial matching settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialOptions {
    pub regrid_res_deg: Option<f64>,
    pub extraction: Extraction,
    pub vert_which: VertWhich,
}

/// Everything a [`Colocator`](crate::Colocator) run needs.
///
/// # Example
///
/// ```
/// use aerocol_colocate::{ColocationSetup, VarPair};
///
/// let setup = ColocationSetup::new("TM5", "EBAS")
///     .with_var_pair(VarPair::new("od550aer", "od550aer"))
///     .with_raise_exceptions(false);
/// assert!(setup.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColocationSetup {
    model_id: String,
    obs_id: String,
    var_pairs: Vec<VarPair>,
    time: TimeOptions,
    filters: FilterOptions,
    resample: ResampleOptions,
    spatial: SpatialOptions,
    harmonise_units: bool,
    raise_exceptions: bool,
}

impl ColocationSetup {
    /// Creates a setup for one model and one observation source.
    ///
    /// Defaults: no variable pairs, flexible ts_type, region `WORLD`,
    /// observation outliers removed, unit harmonisation on, failures
    /// recorded instead of raised.
    pub fn new(model_id: impl Into<String>, obs_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            obs_id: obs_id.into(),
            var_pairs: Vec::new(),
            time: TimeOptions::new(),
            filters: FilterOptions::default(),
            resample: ResampleOptions::default(),
            spatial: SpatialOptions::default(),
            harmonise_units: true,
            raise_exceptions: false,
        }
    }

    pub fn with_var_pair(mut self, pair: VarPair) -> Self {
        self.var_pairs.push(pair);
        self
    }

    pub fn with_var_pairs(mut self, pairs: Vec<VarPair>) -> Self {
        self.var_pairs = pairs;
        self
    }

    pub fn with_time(mut self, time: TimeOptions) -> Self {
        self.time = time;
        self
    }

    pub fn with_filters(mut self, filters: FilterOptions) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_resample(mut self, resample: ResampleOptions) -> Self {
        self.resample = resample;
        self
    }

    pub fn with_spatial(mut self, spatial: SpatialOptions) -> Self {
        self.spatial = spatial;
        self
    }

    pub fn with_harmonise_units(mut self, harmonise: bool) -> Self {
        self.harmonise_units = harmonise;
        self
    }

    /// Abort on the first failing pair instead of recording it.
    pub fn with_raise_exceptions(mut self, raise: bool) -> Self {
        self.raise_exceptions = raise;
        self
    }

    // --- Accessors ---

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn obs_id(&self) -> &str {
        &self.obs_id
    }

    pub fn var_pairs(&self) -> &[VarPair] {
        &self.var_pairs
    }

    pub fn time(&self) -> &TimeOptions {
        &self.time
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    pub fn resample(&self) -> &ResampleOptions {
        &self.resample
    }

    pub fn spatial(&self) -> &SpatialOptions {
        &self.spatial
    }

    pub fn harmonise_units(&self) -> bool {
        self.harmonise_units
    }

    pub fn raise_exceptions(&self) -> bool {
        self.raise_exceptions
    }

    /// Outlier range configured for `var_name`.
    pub fn outlier_range(&self, var_name: &str) -> Option<(f64, f64)> {
        self.filters.var_outlier_ranges.get(var_name).copied()
    }

    /// Options of one pair, with per-variable rules layered over global ones.
    pub fn pair_options(&self, pair: &VarPair) -> ColocationOptions {
        let min_num_obs = match self.resample.var_min_num_obs.get(&pair.obs_var) {
            Some(m) => self.resample.min_num_obs.overridden_by(m),
            None => self.resample.min_num_obs.clone(),
        };
        let how = match self.resample.var_resample_how.get(&pair.obs_var) {
            Some(h) => self.resample.resample_how.overridden_by(h),
            None => self.resample.resample_how.clone(),
        };
        let opts = ColocationOptions::new()
            .with_ts_type(self.time.ts_type)
            .with_period(self.time.start, self.time.stop)
            .with_filter_name(self.filters.filter_name.clone())
            .with_min_num_obs(min_num_obs)
            .with_resample_how(how)
            .with_harmonise_units(self.harmonise_units)
            .with_colocate_time(self.time.colocate_time)
            .with_regrid_res_deg(self.spatial.regrid_res_deg)
            .with_extraction(self.spatial.extraction)
            .with_vert_which(self.spatial.vert_which)
            .with_climatology(self.time.climatology);
        match &self.filters.region {
            Some(region) => opts.with_region(region.clone()),
            None => opts,
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ColocateError> {
        if self.model_id.is_empty() || self.obs_id.is_empty() {
            return Err(ColocateError::Setup {
                reason: "model_id and obs_id must not be empty".to_string(),
            });
        }
        if self.var_pairs.is_empty() {
            return Err(ColocateError::Setup {
                reason: "no variable pairs configured".to_string(),
            });
        }
        for (var, (low, high)) in &self.filters.var_outlier_ranges {
            if low > high {
                return Err(ColocateError::Setup {
                    reason: format!("outlier range of '{var}' has low {low} > high {high}"),
                });
            }
        }
        for pair in &self.var_pairs {
            self.pair_options(pair).validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerocol_tstype::CoverageRule;

    fn ts(s: &str) -> TsType {
        s.parse().unwrap()
    }

    #[test]
    fn defaults() {
        let s = ColocationSetup::new("m", "o");
        assert!(s.time().flex_ts_type);
        assert_eq!(s.filters().filter_name, "WORLD");
        assert!(s.filters().remove_outliers);
        assert!(s.harmonise_units());
        assert!(!s.raise_exceptions());
    }

    #[test]
    fn validate_needs_pairs() {
        assert!(matches!(
            ColocationSetup::new("m", "o").validate(),
            Err(ColocateError::Setup { .. })
        ));
    }

    #[test]
    fn validate_bad_outlier_range() {
        let mut filters = FilterOptions::default();
        filters.var_outlier_ranges.insert("vmro3".to_string(), (10.0, 0.0));
        let s = ColocationSetup::new("m", "o")
            .with_var_pair(VarPair::new("vmro3", "vmro3"))
            .with_filters(filters);
        assert!(s.validate().is_err());
    }

    #[test]
    fn per_var_rules_win() {
        let mut resample = ResampleOptions {
            min_num_obs: MinNumObs::default_obs(),
            ..ResampleOptions::default()
        };
        resample.var_min_num_obs.insert(
            "vmro3".to_string(),
            MinNumObs::Hierarchical(vec![CoverageRule::new(ts("hourly"), ts("daily"), 18)]),
        );
        let s = ColocationSetup::new("m", "o")
            .with_var_pair(VarPair::new("vmro3", "vmro3"))
            .with_var_pair(VarPair::new("concpm10", "concpm10"))
            .with_resample(resample);
        let o3 = s.pair_options(&s.var_pairs()[0]);
        let pm = s.pair_options(&s.var_pairs()[1]);
        assert_eq!(o3.min_num_obs().lookup(&ts("hourly"), &ts("daily")), Some(18));
        assert_eq!(o3.min_num_obs().lookup(&ts("daily"), &ts("monthly")), Some(7));
        assert_eq!(pm.min_num_obs().lookup(&ts("hourly"), &ts("daily")), Some(6));
    }
}
