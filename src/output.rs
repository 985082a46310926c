//! Writing derived colocated files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use aerocol_colocated::ColocatedData;

/// Writes `coldata` to `output`, or under its standard name next to `input`.
pub fn write_colocated(
    coldata: &ColocatedData,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    match output {
        Some(path) => {
            coldata
                .to_netcdf_path(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        }
        None => {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            coldata
                .to_netcdf(dir)
                .with_context(|| format!("failed to write into {}", dir.display()))
        }
    }
}
