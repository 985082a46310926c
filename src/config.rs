use std::collections::BTreeMap;
use std::path::PathBuf;

use aerocol_colocate::VarPair;
use aerocol_resample::ResampleHow;
use aerocol_tstype::MinNumObs;
use serde::Deserialize;

/// Top-level Aerocol configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AerocolConfig {
    /// Model data settings.
    pub model: ModelToml,

    /// Observation data settings.
    pub obs: ObsToml,

    /// Colocation settings.
    #[serde(default)]
    pub colocation: ColocationToml,

    /// Evaluation statistics settings.
    #[serde(default)]
    pub statistics: StatisticsToml,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    pub data_id: String,
    /// Directory scanned for `*.nc` files.
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Resolution used when the files carry no `ts_type` attribute.
    pub ts_type: Option<String>,
    #[serde(default = "default_time_var")]
    pub time_var: String,
}

/// Observation storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObsKind {
    Gridded,
    #[default]
    Ungridded,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObsToml {
    pub obs_id: String,
    #[serde(default)]
    pub kind: ObsKind,
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Dataset name of station files without a `dataset` attribute.
    pub dataset: Option<String>,
    pub ts_type: Option<String>,
    #[serde(default = "default_time_var")]
    pub time_var: String,
    #[serde(default = "default_station_dim")]
    pub station_dim: String,
}

fn default_time_var() -> String {
    "time".to_string()
}
fn default_station_dim() -> String {
    "station".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColocationToml {
    #[serde(default)]
    pub var_pairs: Vec<VarPair>,
    #[serde(default = "default_true")]
    pub harmonise_units: bool,
    #[serde(default)]
    pub raise_exceptions: bool,
    #[serde(default)]
    pub time: TimeToml,
    #[serde(default)]
    pub filters: FiltersToml,
    #[serde(default)]
    pub resample: ResampleToml,
    #[serde(default)]
    pub spatial: SpatialToml,
}

impl Default for ColocationToml {
    fn default() -> Self {
        Self {
            var_pairs: Vec::new(),
            harmonise_units: true,
            raise_exceptions: false,
            time: TimeToml::default(),
            filters: FiltersToml::default(),
            resample: ResampleToml::default(),
            spatial: SpatialToml::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeToml {
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    pub start: Option<String>,
    pub stop: Option<String>,
    pub ts_type: Option<String>,
    #[serde(default = "default_true")]
    pub flex_ts_type: bool,
    #[serde(default)]
    pub colocate_time: bool,
    #[serde(default)]
    pub climatology: Option<ClimatologyToml>,
}

impl Default for TimeToml {
    fn default() -> Self {
        Self {
            start: None,
            stop: None,
            ts_type: None,
            flex_ts_type: true,
            colocate_time: false,
            climatology: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyToml {
    #[serde(default = "default_clim_start")]
    pub start_year: i32,
    #[serde(default = "default_clim_stop")]
    pub stop_year: i32,
    #[serde(default = "default_clim_min_count")]
    pub min_count: u32,
}

fn default_clim_start() -> i32 {
    2005
}
fn default_clim_stop() -> i32 {
    2015
}
fn default_clim_min_count() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiltersToml {
    /// Predefined region name; `WORLD` applies no spatial filter.
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_true")]
    pub remove_outliers: bool,
    #[serde(default)]
    pub model_remove_outliers: bool,
    /// Valid `[low, high]` range per observation variable.
    #[serde(default)]
    pub var_outlier_ranges: BTreeMap<String, [f64; 2]>,
    #[serde(default)]
    pub zeros_to_nan: bool,
}

impl Default for FiltersToml {
    fn default() -> Self {
        Self {
            region: default_region(),
            remove_outliers: true,
            model_remove_outliers: false,
            var_outlier_ranges: BTreeMap::new(),
            zeros_to_nan: false,
        }
    }
}

fn default_region() -> String {
    "WORLD".to_string()
}

/// Coverage and aggregation rules; `min_num_obs` is either a single count
/// or a list of `{ from, to, min_count }` rules.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ResampleToml {
    pub min_num_obs: Option<MinNumObs>,
    pub resample_how: Option<ResampleHow>,
    #[serde(default)]
    pub var_min_num_obs: BTreeMap<String, MinNumObs>,
    #[serde(default)]
    pub var_resample_how: BTreeMap<String, ResampleHow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpatialToml {
    pub regrid_res_deg: Option<f64>,
    #[serde(default = "default_extraction")]
    pub extraction: String,
    /// `surface`, `all`, `station_altitude` or `level:<index>`.
    #[serde(default = "default_vert_which")]
    pub vert_which: String,
}

impl Default for SpatialToml {
    fn default() -> Self {
        Self {
            regrid_res_deg: None,
            extraction: default_extraction(),
            vert_which: default_vert_which(),
        }
    }
}

fn default_extraction() -> String {
    "nearest".to_string()
}
fn default_vert_which() -> String {
    "surface".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatisticsToml {
    /// Statistic names; all when unset.
    pub statistics: Option<Vec<String>>,
    #[serde(default = "default_min_num_valid")]
    pub min_num_valid: usize,
    #[serde(default)]
    pub drop_stats: Vec<String>,
    pub lowlim: Option<f64>,
    pub highlim: Option<f64>,
    #[serde(default)]
    pub use_area_weights: bool,
    #[serde(default = "default_true")]
    pub station_statistics: bool,
    /// Regions evaluated besides WORLD; all predefined ones when unset.
    pub regions: Option<Vec<String>>,
}

impl Default for StatisticsToml {
    fn default() -> Self {
        Self {
            statistics: None,
            min_num_valid: default_min_num_valid(),
            drop_stats: Vec::new(),
            lowlim: None,
            highlim: None,
            use_area_weights: false,
            station_statistics: true,
            regions: None,
        }
    }
}

fn default_min_num_valid() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Write an evaluation JSON next to every colocated file.
    #[serde(default = "default_true")]
    pub write_report: bool,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            write_report: true,
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("colocated_data")
}
