//! Coverage-constrained time resampling for aerocol.
//!
//! Aggregates a time series to a coarser ts_type, emitting NaN for every
//! output period that lacks the required number of valid samples. Coverage
//! rules may be hierarchical: going from hourly to monthly with a daily rule
//! first builds daily values, then counts only the valid days per month.
//!
//! # Pipeline
//!
//! ```text
//!  ┌────────────┐     ┌──────────────────┐     ┌──────────────────┐
//!  │ TimeSeries │────▶│   plan_steps      │────▶│ resample (per     │
//!  │ (from)     │     │ (rules, ladder)   │     │ step, NaN gaps)   │
//!  └────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use aerocol_resample::{ResampleConfig, TimeSeries, mda8, Mda8Config, resample_to};
//! use aerocol_tstype::{MinNumObs, TsType};
//!
//! let series = TimeSeries::new(times, values)?;
//! let config = ResampleConfig::new().with_min_num_obs(MinNumObs::default_obs());
//! let monthly = resample_to(&series, &"hourly".parse()?, &"monthly".parse()?, &config)?;
//!
//! let daily_max = mda8(&series, &Mda8Config::new())?;
//! ```

mod config;
mod error;
mod how;
mod mda8;
mod resample;
mod series;

pub use config::ResampleConfig;
pub use error::ResampleError;
pub use how::{Aggregation, HowRule, ResampleHow};
pub use mda8::{Mda8Config, mda8, rolling_mean};
pub use resample::{ResampleStep, plan_steps, resample, resample_step, resample_to};
pub use series::{TimeSeries, mask_jointly};
