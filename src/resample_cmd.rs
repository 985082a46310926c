//! Resample command: change the temporal resolution of a colocated file.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use aerocol_colocated::{ColocatedData, TimeResampleOptions};
use aerocol_tstype::MinNumObs;

use crate::cli::ResampleArgs;
use crate::convert;

/// Resample one colocated file and write the result.
pub fn run(args: ResampleArgs) -> Result<()> {
    let _cmd = info_span!("resample").entered();
    let to = convert::parse_ts_type(&args.to)?;

    let mut opts = TimeResampleOptions::new(to)
        .with_colocate_time(args.colocate_time)
        .with_settings_from_meta(args.settings_from_meta);
    if let Some(n) = args.min_num_obs {
        opts = opts.with_min_num_obs(MinNumObs::Fixed(n));
    }

    let coldata = ColocatedData::read_netcdf(&args.file)
        .with_context(|| format!("failed to read colocated data: {}", args.file.display()))?;
    let from = coldata.ts_type()?;
    info!(from = %from, to = %to, "resampling colocated data");
    let resampled = coldata
        .resample_time(&opts)
        .with_context(|| format!("failed to resample to {to}"))?;

    let path = crate::output::write_colocated(&resampled, &args.file, args.output)?;
    info!(path = %path.display(), "resampled data written");
    Ok(())
}
