//! Stats command: evaluation report of a colocated NetCDF file.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use aerocol_colocated::ColocatedData;
use aerocol_evaluate::{EvaluateConfig, evaluate, to_json};
use aerocol_stats::StatisticsConfig;

use crate::cli::StatsArgs;
use crate::convert;

/// Compute regional and per-station statistics of one colocated file.
pub fn run(args: StatsArgs) -> Result<()> {
    let _cmd = info_span!("stats").entered();

    let mut eval_cfg = EvaluateConfig::default()
        .with_statistics(StatisticsConfig::new().with_min_num_valid(args.min_num_valid))
        .with_use_area_weights(args.area_weights);
    if !args.regions.is_empty() {
        eval_cfg = eval_cfg.with_regions(convert::parse_regions(&args.regions)?);
    }

    info!(path = %args.file.display(), "reading colocated data");
    let coldata = ColocatedData::read_netcdf(&args.file)
        .with_context(|| format!("failed to read colocated data: {}", args.file.display()))?;

    let report = evaluate(&coldata, &eval_cfg).context("evaluation failed")?;
    let json = to_json(&report)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
