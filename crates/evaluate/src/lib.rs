//! # aerocol-evaluate
//!
//! Statistics report for a colocated container: WORLD plus configured
//! regions (with placeholder statistics where a region has no data),
//! per-station statistics, and rolled-up spatial and temporal correlations.
//!
//! ```ignore
//! use aerocol_evaluate::{EvaluateConfig, evaluate, to_json};
//!
//! let output = evaluate(&coldata, &EvaluateConfig::default())?;
//! println!("{}", to_json(&output)?);
//! ```

mod config;
mod correlations;
mod error;
mod output;
mod regional;

use aerocol_colocated::ColocatedData;
use tracing::info;

pub use config::EvaluateConfig;
pub use correlations::{add_rolled_up, spatial_r_per_timestep, temporal_r_per_point};
pub use error::EvaluateError;
pub use output::{EvaluationOutput, RegionStats, StationStats, to_json};
pub use regional::{regional_statistics, station_statistics};

/// Evaluate a colocated container.
///
/// # Errors
///
/// Returns [`EvaluateError::Validation`] for an invalid configuration and
/// propagates container and statistics errors.
pub fn evaluate(
    coldata: &ColocatedData,
    config: &EvaluateConfig,
) -> Result<EvaluationOutput, EvaluateError> {
    config.validate()?;
    let regions = regional_statistics(coldata, config)?;
    let stations = if config.station_statistics() {
        station_statistics(coldata, config)?
    } else {
        Vec::new()
    };
    info!(
        regions = regions.len(),
        dummies = regions.iter().filter(|r| r.dummy).count(),
        stations = stations.len(),
        "evaluation complete"
    );
    Ok(EvaluationOutput {
        meta: coldata.meta().clone(),
        regions,
        stations,
    })
}
