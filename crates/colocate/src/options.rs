//! Parameters of a single colocation call.

use aerocol_colocated::Region;
use aerocol_resample::{ResampleConfig, ResampleHow};
use aerocol_tstype::{MinNumObs, TsType};
use chrono::NaiveDateTime;

use crate::error::ColocateError;
use crate::extract::Extraction;
use crate::source::VertWhich;

/// Monthly observation climatology settings.
///
/// Observations from `start_year..=stop_year` are averaged per calendar
/// month; a month needs at least `min_count` valid yearly values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimatologyOptions {
    pub start_year: i32,
    pub stop_year: i32,
    pub min_count: u32,
}

impl Default for ClimatologyOptions {
    fn default() -> Self {
        Self {
            start_year: 2005,
            stop_year: 2015,
            min_count: 5,
        }
    }
}

/// Options of [`colocate_gridded_gridded`](crate::colocate_gridded_gridded)
/// and [`colocate_gridded_ungridded`](crate::colocate_gridded_ungridded).
///
/// # Example
///
/// ```
/// use aerocol_colocate::{ColocationOptions, Extraction};
/// use aerocol_tstype::MinNumObs;
///
/// let opts = ColocationOptions::new()
///     .with_ts_type(Some("monthly".parse().unwrap()))
///     .with_min_num_obs(MinNumObs::default_obs())
///     .with_extraction(Extraction::Bilinear);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColocationOptions {
    ts_type: Option<TsType>,
    start: Option<NaiveDateTime>,
    stop: Option<NaiveDateTime>,
    filter_name: String,
    region: Option<Region>,
    min_num_obs: MinNumObs,
    resample_how: ResampleHow,
    harmonise_units: bool,
    colocate_time: bool,
    regrid_res_deg: Option<f64>,
    extraction: Extraction,
    vert_which: VertWhich,
    climatology: Option<ClimatologyOptions>,
}

impl ColocationOptions {
    /// Creates options with defaults.
    ///
    /// Defaults: output at the coarser input resolution, full overlap
    /// period, region `WORLD`, no coverage rules, mean aggregation, unit
    /// harmonisation on, nearest-cell surface extraction.
    pub fn new() -> Self {
        Self {
            ts_type: None,
            start: None,
            stop: None,
            filter_name: "WORLD".to_string(),
            region: None,
            min_num_obs: MinNumObs::none(),
            resample_how: ResampleHow::default(),
            harmonise_units: true,
            colocate_time: false,
            regrid_res_deg: None,
            extraction: Extraction::Nearest,
            vert_which: VertWhich::Surface,
            climatology: None,
        }
    }

    /// Sets the output resolution.
    pub fn with_ts_type(mut self, ts_type: Option<TsType>) -> Self {
        self.ts_type = ts_type;
        self
    }

    /// Restricts colocation to `[start, stop]`.
    pub fn with_period(mut self, start: Option<NaiveDateTime>, stop: Option<NaiveDateTime>) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    /// Sets a predefined region by name.
    pub fn with_filter_name(mut self, name: impl Into<String>) -> Self {
        self.filter_name = name.into();
        self
    }

    /// Sets a custom region; its name becomes the filter name.
    pub fn with_region(mut self, region: Region) -> Self {
        self.filter_name = region.name.clone();
        self.region = Some(region);
        self
    }

    pub fn with_min_num_obs(mut self, min_num_obs: MinNumObs) -> Self {
        self.min_num_obs = min_num_obs;
        self
    }

    pub fn with_resample_how(mut self, how: ResampleHow) -> Self {
        self.resample_how = how;
        self
    }

    pub fn with_harmonise_units(mut self, harmonise: bool) -> Self {
        self.harmonise_units = harmonise;
        self
    }

    pub fn with_colocate_time(mut self, colocate_time: bool) -> Self {
        self.colocate_time = colocate_time;
        self
    }

    pub fn with_regrid_res_deg(mut self, res: Option<f64>) -> Self {
        self.regrid_res_deg = res;
        self
    }

    pub fn with_extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_vert_which(mut self, vert_which: VertWhich) -> Self {
        self.vert_which = vert_which;
        self
    }

    pub fn with_climatology(mut self, climatology: Option<ClimatologyOptions>) -> Self {
        self.climatology = climatology;
        self
    }

    // --- Accessors ---

    pub fn ts_type(&self) -> Option<TsType> {
        self.ts_type
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn stop(&self) -> Option<NaiveDateTime> {
        self.stop
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    pub fn min_num_obs(&self) -> &MinNumObs {
        &self.min_num_obs
    }

    pub fn resample_how(&self) -> &ResampleHow {
        &self.resample_how
    }

    pub fn harmonise_units(&self) -> bool {
        self.harmonise_units
    }

    pub fn colocate_time(&self) -> bool {
        self.colocate_time
    }

    pub fn regrid_res_deg(&self) -> Option<f64> {
        self.regrid_res_deg
    }

    pub fn extraction(&self) -> Extraction {
        self.extraction
    }

    pub fn vert_which(&self) -> VertWhich {
        self.vert_which
    }

    pub fn climatology(&self) -> Option<&ClimatologyOptions> {
        self.climatology.as_ref()
    }

    /// The region to filter by: the custom one, else the named one.
    pub fn region(&self) -> Result<Region, ColocateError> {
        match &self.region {
            Some(r) => Ok(r.clone()),
            None => Ok(Region::get(&self.filter_name)?),
        }
    }

    /// Resampling settings derived from the coverage and aggregation rules.
    pub fn resample_config(&self) -> ResampleConfig {
        ResampleConfig::new()
            .with_min_num_obs(self.min_num_obs.clone())
            .with_how(self.resample_how.clone())
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ColocateError> {
        if let (Some(start), Some(stop)) = (self.start, self.stop)
            && start > stop
        {
            return Err(ColocateError::Setup {
                reason: format!("start {start} is after stop {stop}"),
            });
        }
        if let Some(res) = self.regrid_res_deg
            && !(res > 0.0 && res <= 180.0)
        {
            return Err(ColocateError::Setup {
                reason: format!("regrid_res_deg must be in (0, 180], got {res}"),
            });
        }
        if let Some(clim) = &self.climatology {
            if clim.start_year > clim.stop_year {
                return Err(ColocateError::Setup {
                    reason: format!(
                        "climatology start year {} is after stop year {}",
                        clim.start_year, clim.stop_year
                    ),
                });
            }
            use chrono::Datelike;
            match (self.start, self.stop) {
                (Some(start), Some(stop)) if start.year() == stop.year() => {}
                _ => {
                    return Err(ColocateError::Setup {
                        reason: "climatology mode requires start and stop within a single year"
                            .to_string(),
                    });
                }
            }
        }
        self.region()?;
        self.resample_config().validate()?;
        Ok(())
    }
}

impl Default for ColocationOptions {
    fn default() -> Self {
        Self::new()
    }
}
