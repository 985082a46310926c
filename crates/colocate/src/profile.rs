//! Vertical profile colocation over altitude layers.

use aerocol_colocated::{ColocatedData, VerticalLayer};
use tracing::{info, instrument};

use crate::error::ColocateError;
use crate::gridded::GriddedData;
use crate::gridded_ungridded::colocate_gridded_ungridded;
use crate::options::ColocationOptions;
use crate::source::VertWhich;
use crate::station::StationData;

/// Altitude layers of a profile colocation, in metres.
///
/// Statistics are usually computed on a few coarse layers while plots use
/// finer ones, hence two lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerSpec {
    pub statistics: Vec<VerticalLayer>,
    pub profile_viz: Vec<VerticalLayer>,
}

impl LayerSpec {
    pub fn new(statistics: Vec<VerticalLayer>, profile_viz: Vec<VerticalLayer>) -> Self {
        Self {
            statistics,
            profile_viz,
        }
    }

    pub fn validate(&self) -> Result<(), ColocateError> {
        if self.statistics.is_empty() && self.profile_viz.is_empty() {
            return Err(ColocateError::Setup {
                reason: "no vertical layers given".to_string(),
            });
        }
        for l in self.statistics.iter().chain(&self.profile_viz) {
            if !(l.start < l.end) {
                return Err(ColocateError::Setup {
                    reason: format!("layer {} - {} m is empty", l.start, l.end),
                });
            }
        }
        Ok(())
    }
}

/// One container per layer, grouped by purpose.
#[derive(Debug, Clone, Default)]
pub struct ColocatedDataLists {
    pub for_statistics: Vec<ColocatedData>,
    pub for_profile_viz: Vec<ColocatedData>,
}

fn station_layer(stations: &[StationData], var: &str, layer: &VerticalLayer) -> Result<Vec<StationData>, ColocateError> {
    let mut out = Vec::new();
    for st in stations {
        let Some(profile) = st.profiles.get(var) else {
            continue;
        };
        let mut s = st.clone();
        s.series.insert(var.to_string(), profile.layer_mean(layer)?);
        out.push(s);
    }
    Ok(out)
}

fn colocate_layer(
    model: &GriddedData,
    stations: &[StationData],
    obs_var: &str,
    layer: &VerticalLayer,
    opts: &ColocationOptions,
) -> Result<ColocatedData, ColocateError> {
    let model_layer = model.layer_mean(layer)?;
    let obs_layer = station_layer(stations, obs_var, layer)?;
    let mut coldata = colocate_gridded_ungridded(&model_layer, &obs_layer, obs_var, opts)?;
    let meta = coldata.meta_mut();
    meta.vertical_layer = Some(*layer);
    meta.vert_code = Some("Profile".to_string());
    Ok(coldata)
}

/// Colocates a multi-level model field with station profiles of `obs_var`.
///
/// Model levels and profile bins inside each layer are averaged, then the
/// layer series are colocated like surface data.
#[instrument(skip_all, fields(model = model.data_id(), var = obs_var))]
pub fn colocate_vertical_profile(
    model: &GriddedData,
    stations: &[StationData],
    obs_var: &str,
    layers: &LayerSpec,
    opts: &ColocationOptions,
) -> Result<ColocatedDataLists, ColocateError> {
    layers.validate()?;
    if model.level_altitude().is_none() {
        return Err(ColocateError::DataDimension {
            reason: format!("'{}' has no level altitudes", model.var_name()),
        });
    }
    let opts = opts.clone().with_vert_which(VertWhich::Surface);
    let mut out = ColocatedDataLists::default();
    for layer in &layers.statistics {
        out.for_statistics
            .push(colocate_layer(model, stations, obs_var, layer, &opts)?);
    }
    for layer in &layers.profile_viz {
        out.for_profile_viz
            .push(colocate_layer(model, stations, obs_var, layer, &opts)?);
    }
    info!(
        statistics = out.for_statistics.len(),
        profile_viz = out.for_profile_viz.len(),
        "colocated vertical profile"
    );
    Ok(out)
}
