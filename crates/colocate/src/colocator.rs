//! Batch colocation of every configured variable pair.

use std::fmt;
use std::path::{Path, PathBuf};

use aerocol_colocated::ColocatedData;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::error::ColocateError;
use crate::gridded::GriddedData;
use crate::gridded_gridded::colocate_gridded_gridded;
use crate::gridded_ungridded::colocate_gridded_ungridded;
use crate::setup::{ColocationSetup, VarPair};
use crate::source::{GriddedSource, ObsSource, ReadRequest, VertWhich};
use crate::station::StationData;

/// Why a variable pair produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    MissingModelVar,
    MissingObsVar,
    ModelReadFailed,
    ColocationFailed,
}

impl FailureReason {
    pub fn name(self) -> &'static str {
        match self {
            FailureReason::MissingModelVar => "missing_model_var",
            FailureReason::MissingObsVar => "missing_obs_var",
            FailureReason::ModelReadFailed => "model_read_failed",
            FailureReason::ColocationFailed => "colocation_failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one variable pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStatus {
    pub model_var: String,
    pub obs_var: String,
    /// `None` on success.
    pub reason: Option<FailureReason>,
    pub message: Option<String>,
}

impl PairStatus {
    pub fn is_ok(&self) -> bool {
        self.reason.is_none()
    }
}

/// A successfully colocated pair.
#[derive(Debug, Clone)]
pub struct PairResult {
    pub model_var: String,
    pub obs_var: String,
    pub data: ColocatedData,
}

/// Results and per-pair status table of a [`Colocator::run`].
#[derive(Debug, Clone, Default)]
pub struct ColocationRun {
    pub results: Vec<PairResult>,
    pub status: Vec<PairStatus>,
}

impl ColocationRun {
    /// Result for a pair, if it succeeded.
    pub fn get(&self, model_var: &str, obs_var: &str) -> Option<&ColocatedData> {
        self.results
            .iter()
            .find(|r| r.model_var == model_var && r.obs_var == obs_var)
            .map(|r| &r.data)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PairStatus> {
        self.status.iter().filter(|s| !s.is_ok())
    }

    /// Writes every result to `dir` under its standard file name.
    pub fn save_all(&self, dir: &Path) -> Result<Vec<PathBuf>, ColocateError> {
        let mut paths = Vec::with_capacity(self.results.len());
        for r in &self.results {
            let path = r.data.to_netcdf(dir)?;
            info!(path = %path.display(), "saved colocated data");
            paths.push(path);
        }
        Ok(paths)
    }
}

struct PairFailure {
    reason: FailureReason,
    error: ColocateError,
}

fn fail(reason: FailureReason) -> impl FnOnce(ColocateError) -> PairFailure {
    move |error| PairFailure { reason, error }
}

/// Runs a [`ColocationSetup`] against one model and one observation source.
///
/// Pairs are processed in order and independently: a failing pair is
/// logged and recorded in the status table, the run continues. With
/// `raise_exceptions` the first failure is returned instead. Internal
/// errors always abort.
pub struct Colocator {
    setup: ColocationSetup,
    model: Box<dyn GriddedSource>,
    obs: ObsSource,
}

impl Colocator {
    pub fn new(setup: ColocationSetup, model: Box<dyn GriddedSource>, obs: ObsSource) -> Self {
        Self { setup, model, obs }
    }

    pub fn setup(&self) -> &ColocationSetup {
        &self.setup
    }

    /// Colocates every variable pair of the setup.
    pub fn run(&mut self) -> Result<ColocationRun, ColocateError> {
        self.setup.validate()?;
        if let ObsSource::Ungridded(src) = &self.obs {
            let datasets = src.contains_datasets();
            if datasets.len() != 1 {
                return Err(ColocateError::Setup {
                    reason: format!(
                        "observation source must hold exactly one dataset, found {}: [{}]",
                        datasets.len(),
                        datasets.join(", ")
                    ),
                });
            }
        }

        let mut run = ColocationRun::default();
        let pairs = self.setup.var_pairs().to_vec();
        for pair in pairs {
            let _span = info_span!("pair", model_var = %pair.model_var, obs_var = %pair.obs_var).entered();
            match self.run_pair(&pair) {
                Ok(data) => {
                    info!(shape = ?data.shape(), "pair colocated");
                    run.status.push(PairStatus {
                        model_var: pair.model_var.clone(),
                        obs_var: pair.obs_var.clone(),
                        reason: None,
                        message: None,
                    });
                    run.results.push(PairResult {
                        model_var: pair.model_var,
                        obs_var: pair.obs_var,
                        data,
                    });
                }
                Err(PairFailure { reason, error }) => {
                    if error.is_fatal() || self.setup.raise_exceptions() {
                        return Err(error);
                    }
                    warn!(%reason, error = %error, "pair skipped");
                    run.status.push(PairStatus {
                        model_var: pair.model_var,
                        obs_var: pair.obs_var,
                        reason: Some(reason),
                        message: Some(error.to_string()),
                    });
                }
            }
        }
        info!(
            ok = run.results.len(),
            failed = run.status.len() - run.results.len(),
            "colocation run finished"
        );
        Ok(run)
    }

    fn read_request(&self, var_name: &str, vert_which: VertWhich) -> ReadRequest {
        let time = self.setup.time();
        ReadRequest::new(var_name)
            .with_period(time.start, time.stop)
            .with_ts_type(time.ts_type)
            .with_vert_which(vert_which)
            .with_flex_ts_type(time.flex_ts_type)
    }

    fn run_pair(&mut self, pair: &VarPair) -> Result<ColocatedData, PairFailure> {
        if !self.model.has_var(&pair.model_var) {
            return Err(PairFailure {
                reason: FailureReason::MissingModelVar,
                error: ColocateError::VariableNotFound {
                    var_name: pair.model_var.clone(),
                    source_name: self.model.data_id().to_string(),
                },
            });
        }
        if !self.obs.has_var(&pair.obs_var) {
            return Err(PairFailure {
                reason: FailureReason::MissingObsVar,
                error: ColocateError::VariableNotFound {
                    var_name: pair.obs_var.clone(),
                    source_name: self.obs.name(),
                },
            });
        }

        let request = self.read_request(&pair.model_var, self.setup.spatial().vert_which);
        let mut model = self
            .model
            .read_var(&request)
            .map_err(fail(FailureReason::ModelReadFailed))?;
        remove_field_outliers(
            &self.setup,
            self.setup.filters().model_remove_outliers,
            &mut model,
            &pair.obs_var,
        );

        let opts = self.setup.pair_options(pair);
        let coloc = fail(FailureReason::ColocationFailed);
        let mut data = match &mut self.obs {
            ObsSource::Gridded(src) => {
                let request = ReadRequest::new(&pair.obs_var)
                    .with_period(self.setup.time().start, self.setup.time().stop);
                let mut obs = src
                    .read_var(&request)
                    .map_err(fail(FailureReason::ColocationFailed))?;
                remove_field_outliers(
                    &self.setup,
                    self.setup.filters().remove_outliers,
                    &mut obs,
                    &pair.obs_var,
                );
                colocate_gridded_gridded(&model, &obs, &opts).map_err(coloc)?
            }
            ObsSource::Ungridded(src) => {
                let mut stations = src
                    .read(std::slice::from_ref(&pair.obs_var))
                    .map_err(fail(FailureReason::ColocationFailed))?;
                remove_station_outliers(&self.setup, &mut stations, &pair.obs_var)
                    .map_err(fail(FailureReason::ColocationFailed))?;
                colocate_gridded_ungridded(&model, &stations, &pair.obs_var, &opts).map_err(coloc)?
            }
        };
        if self.setup.filters().zeros_to_nan {
            data.set_zeros_nan();
        }
        Ok(data)
    }
}

// Outlier ranges are keyed by the observation variable on both sides.
fn remove_field_outliers(setup: &ColocationSetup, enabled: bool, field: &mut GriddedData, obs_var: &str) {
    if enabled && let Some((low, high)) = setup.outlier_range(obs_var) {
        field.remove_outliers(low, high);
    }
}

fn remove_station_outliers(
    setup: &ColocationSetup,
    stations: &mut [StationData],
    obs_var: &str,
) -> Result<(), ColocateError> {
    if setup.filters().remove_outliers
        && let Some((low, high)) = setup.outlier_range(obs_var)
    {
        for st in stations {
            st.remove_outliers(obs_var, low, high)?;
        }
    }
    Ok(())
}
