//! Statistics per region and per station.

use aerocol_colocated::{ColocatedData, ColocatedDataError, Layout, Region};
use aerocol_stats::{StatsDict, calculate_statistics, stats_dummy};
use tracing::{debug, warn};

use crate::config::EvaluateConfig;
use crate::correlations::add_rolled_up;
use crate::error::EvaluateError;
use crate::output::{RegionStats, StationStats};

fn region_stats(coldata: &ColocatedData, config: &EvaluateConfig) -> Result<StatsDict, EvaluateError> {
    let mut stats = coldata.calc_statistics(config.use_area_weights(), config.statistics())?;
    add_rolled_up(&mut stats, coldata, config.statistics().min_num_valid())?;
    Ok(stats)
}

/// Statistics for WORLD and every configured region.
///
/// A region left without valid pairs, or one the layout cannot filter to,
/// gets an all-NaN placeholder carrying the same keys.
pub fn regional_statistics(
    coldata: &ColocatedData,
    config: &EvaluateConfig,
) -> Result<Vec<RegionStats>, EvaluateError> {
    let world = Region::get("WORLD")?;
    let mut out = Vec::with_capacity(config.regions().len() + 1);
    for region in std::iter::once(&world).chain(config.regions()) {
        let subset = if region.name == world.name {
            Ok(coldata.clone())
        } else {
            coldata.apply_latlon_filter(region)
        };
        let subset = match subset {
            Ok(s) if s.num_coords_with_data() > 0 => Some(s),
            Ok(_) => None,
            Err(ColocatedDataError::DataCoverage { reason }) => {
                debug!(region = %region.name, %reason, "region has no coverage");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let (dummy, stats) = match subset {
            Some(s) => (false, region_stats(&s, config)?),
            None => {
                debug!(region = %region.name, "no valid pairs, using placeholder statistics");
                (true, stats_dummy(config.statistics())?)
            }
        };
        out.push(RegionStats {
            region: region.name.clone(),
            dummy,
            stats,
        });
    }
    Ok(out)
}

/// Temporal statistics of each station of point data.
///
/// Gridded data has no stations and yields an empty list.
pub fn station_statistics(
    coldata: &ColocatedData,
    config: &EvaluateConfig,
) -> Result<Vec<StationStats>, EvaluateError> {
    if coldata.layout() == Layout::Grid {
        warn!("per-station statistics are not defined for gridded data");
        return Ok(Vec::new());
    }
    let flat = coldata.flat()?;
    let names = coldata.station_name()?;
    let lat = coldata.latitude()?;
    let lon = coldata.longitude()?;
    let altitude = coldata.altitude().ok();
    let country = coldata.country().ok();

    (0..names.len())
        .map(|p| {
            let reference: Vec<f64> = flat.slice(ndarray::s![0, .., p]).to_vec();
            let model: Vec<f64> = flat.slice(ndarray::s![1, .., p]).to_vec();
            Ok(StationStats {
                station_name: names[p].clone(),
                latitude: lat[p],
                longitude: lon[p],
                altitude: altitude.map(|a| a[p]),
                country: country.map(|c| c[p].clone()),
                stats: calculate_statistics(&model, &reference, None, config.statistics())?,
            })
        })
        .collect()
}
