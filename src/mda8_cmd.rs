//! MDA8 command: daily maximum 8-hour running mean of hourly ozone.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use aerocol_colocated::ColocatedData;

use crate::cli::Mda8Args;

/// Compute MDA8 of one hourly colocated file and write the result.
pub fn run(args: Mda8Args) -> Result<()> {
    let _cmd = info_span!("mda8").entered();

    let coldata = ColocatedData::read_netcdf(&args.file)
        .with_context(|| format!("failed to read colocated data: {}", args.file.display()))?;
    let daily = coldata.mda8().context("MDA8 computation failed")?;

    let path = crate::output::write_colocated(&daily, &args.file, args.output)?;
    info!(path = %path.display(), "MDA8 data written");
    Ok(())
}
