//! Colocate command: batch colocation from a TOML configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use aerocol_colocate::{Colocator, GriddedSource, ObsSource};
use aerocol_evaluate::{evaluate, to_json};
use aerocol_io::{NetcdfGriddedSource, NetcdfUngriddedSource};

use crate::cli::ColocateArgs;
use crate::config::{AerocolConfig, ObsKind};
use crate::convert;

/// Name of the per-pair status table written next to the results.
const STATUS_FILE: &str = "colocation_status.json";

/// Run a batch colocation and write its results.
pub fn run(args: ColocateArgs) -> Result<()> {
    let _cmd = info_span!("colocate").entered();
    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: AerocolConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    let setup = convert::build_setup(&config)?;
    let eval_cfg = convert::build_evaluate_config(&config.statistics)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.output.out_dir.clone());

    // 2. Open sources
    let model = open_model(&config)?;
    let obs = open_obs(&config)?;

    // 3. Colocate
    info!(
        model = setup.model_id(),
        obs = setup.obs_id(),
        pairs = setup.var_pairs().len(),
        "running colocation"
    );
    let run = Colocator::new(setup, model, obs)
        .run()
        .context("colocation failed")?;
    for failure in run.failures() {
        warn!(
            model_var = %failure.model_var,
            obs_var = %failure.obs_var,
            reason = ?failure.reason,
            message = failure.message.as_deref().unwrap_or(""),
            "variable pair skipped"
        );
    }

    // 4. Write results, status and reports
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;
    let status_path = out_dir.join(STATUS_FILE);
    let status = serde_json::to_string_pretty(&run.status).context("failed to encode status")?;
    std::fs::write(&status_path, status)
        .with_context(|| format!("failed to write status: {}", status_path.display()))?;

    if run.results.is_empty() {
        bail!(
            "no variable pair could be colocated, see {}",
            status_path.display()
        );
    }
    let paths = run.save_all(&out_dir).context("failed to write colocated data")?;

    if config.output.write_report {
        for (result, path) in run.results.iter().zip(&paths) {
            let report = evaluate(&result.data, &eval_cfg).with_context(|| {
                format!("evaluation of {} failed", path.display())
            })?;
            let json = to_json(&report)?;
            let report_path = path.with_extension("json");
            std::fs::write(&report_path, json)
                .with_context(|| format!("failed to write report: {}", report_path.display()))?;
            info!(path = %report_path.display(), "report written");
        }
    }

    info!(
        written = paths.len(),
        failed = run.failures().count(),
        out_dir = %out_dir.display(),
        "colocation finished"
    );
    Ok(())
}

fn open_model(config: &AerocolConfig) -> Result<Box<dyn GriddedSource>> {
    let model = &config.model;
    let reader_cfg = convert::build_gridded_reader_config(&model.time_var, model.ts_type.as_ref())?;
    let source = match convert::source_files("model", model.dir.as_deref(), &model.files)? {
        Some(dir) => NetcdfGriddedSource::from_dir(&model.data_id, dir, reader_cfg),
        None => NetcdfGriddedSource::from_files(&model.data_id, &model.files, reader_cfg),
    }
    .with_context(|| format!("failed to open model data '{}'", model.data_id))?;
    Ok(Box::new(source))
}

fn open_obs(config: &AerocolConfig) -> Result<ObsSource> {
    let obs = &config.obs;
    let dir = convert::source_files("obs", obs.dir.as_deref(), &obs.files)?;
    match obs.kind {
        ObsKind::Gridded => {
            let reader_cfg = convert::build_gridded_reader_config(&obs.time_var, obs.ts_type.as_ref())?;
            let source = match dir {
                Some(dir) => NetcdfGriddedSource::from_dir(&obs.obs_id, dir, reader_cfg),
                None => NetcdfGriddedSource::from_files(&obs.obs_id, &obs.files, reader_cfg),
            }
            .with_context(|| format!("failed to open gridded obs '{}'", obs.obs_id))?;
            Ok(ObsSource::Gridded(Box::new(source)))
        }
        ObsKind::Ungridded => {
            let reader_cfg = convert::build_station_reader_config(obs)?;
            let files = match dir {
                Some(dir) => list_nc_files(dir)?,
                None => obs.files.clone(),
            };
            let source = NetcdfUngriddedSource::from_files(&files, &reader_cfg)
                .with_context(|| format!("failed to open station obs '{}'", obs.obs_id))?;
            Ok(ObsSource::Ungridded(Box::new(source)))
        }
    }
}

/// Every `*.nc` file in `dir`, sorted by name.
fn list_nc_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "nc"))
        .collect();
    files.sort();
    if files.is_empty() {
        bail!("no .nc files in {}", dir.display());
    }
    Ok(files)
}
