//! # aerocol-stats
//!
//! Agreement statistics between a model series and its reference
//! (observation) series: bias, error and correlation measures computed over
//! NaN-filtered pairs, with optional weights.
//!
//! ## Pipeline
//!
//! ```text
//!  (data, ref_data, weights)
//!        │
//!        ▼
//!  FilterNaN ─▶ FilterByLimit ─▶ min_num_valid gate ─▶ Statistic::compute ─▶ FilterDropStats
//!                                                                                  │
//!                                                                                  ▼
//!                                                                              StatsDict
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use aerocol_stats::{StatisticsConfig, calculate_statistics, stats_dummy};
//!
//! let config = StatisticsConfig::new().with_min_num_valid(2);
//! let stats = calculate_statistics(&model, &obs, None, &config)?;
//! let nmb = stats.get("nmb");
//!
//! // Placeholder with identical keys for regions without data
//! let dummy = stats_dummy(&config)?;
//! ```

mod calculate;
mod config;
mod descriptive;
mod dict;
mod error;
mod filters;
mod statistic;

pub use calculate::{calculate_statistics, stats_dummy};
pub use config::StatisticsConfig;
pub use descriptive::{Aggregate, nanmean, nanmedian};
pub use dict::{NUM_VALID, ROLLED_UP_KEYS, StatsDict, TOTNUM, WEIGHTED};
pub use error::StatsError;
pub use filters::{DataFilter, FilterByLimit, FilterDropStats, FilterNaN, StatisticsFilter};
pub use statistic::{Statistic, kendall_tau_b, pearson, spearman};
