//! Pure conversion functions: TOML config structs -> crate API config types.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use crate::config::*;

use aerocol_colocate::{
    ClimatologyOptions, ColocationSetup, Extraction, FilterOptions, ResampleOptions, SpatialOptions,
    TimeOptions, VertWhich,
};
use aerocol_colocated::Region;
use aerocol_evaluate::EvaluateConfig;
use aerocol_io::{GriddedReaderConfig, StationReaderConfig};
use aerocol_stats::{Statistic, StatisticsConfig};
use aerocol_tstype::TsType;

/// Parses a ts_type string such as `daily` or `3hourly`.
pub fn parse_ts_type(s: &str) -> Result<TsType> {
    s.parse()
        .with_context(|| format!("invalid ts_type: {s:?}"))
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS` (a space also separates).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Ok(d.and_time(chrono::NaiveTime::MIN)),
        Err(_) => bail!("invalid date: {s:?}, expected YYYY-MM-DD[THH:MM:SS]"),
    }
}

/// Parses a vertical selection: `surface`, `all`, `station_altitude` or
/// `level:<index>`.
pub fn parse_vert_which(s: &str) -> Result<VertWhich> {
    match s.to_lowercase().as_str() {
        "surface" => Ok(VertWhich::Surface),
        "all" => Ok(VertWhich::All),
        "station_altitude" => Ok(VertWhich::StationAltitude),
        other => match other.strip_prefix("level:") {
            Some(idx) => {
                let idx: usize = idx
                    .parse()
                    .with_context(|| format!("invalid level index in {other:?}"))?;
                Ok(VertWhich::Level(idx))
            }
            None => bail!("unknown vert_which: {other:?}"),
        },
    }
}

/// Looks up each name as a predefined region.
pub fn parse_regions(names: &[String]) -> Result<Vec<Region>> {
    names
        .iter()
        .map(|n| Region::get(n).with_context(|| format!("unknown region: {n:?}")))
        .collect()
}

fn optional_ts_type(s: Option<&String>) -> Result<Option<TsType>> {
    s.map(|s| parse_ts_type(s)).transpose()
}

/// Builds the [`TimeOptions`] of a setup.
pub fn build_time_options(time: &TimeToml) -> Result<TimeOptions> {
    let start = time.start.as_deref().map(parse_datetime).transpose()?;
    let stop = time.stop.as_deref().map(parse_datetime).transpose()?;
    if let (Some(a), Some(b)) = (start, stop)
        && a > b
    {
        bail!("colocation start {a} is after stop {b}");
    }
    Ok(TimeOptions {
        start,
        stop,
        ts_type: optional_ts_type(time.ts_type.as_ref())?,
        flex_ts_type: time.flex_ts_type,
        colocate_time: time.colocate_time,
        climatology: time.climatology.as_ref().map(|c| ClimatologyOptions {
            start_year: c.start_year,
            stop_year: c.stop_year,
            min_count: c.min_count,
        }),
    })
}

/// Builds the [`FilterOptions`] of a setup.
pub fn build_filter_options(filters: &FiltersToml) -> Result<FilterOptions> {
    let region = Region::get(&filters.region)
        .with_context(|| format!("unknown region: {:?}", filters.region))?;
    let region = (region.name != "WORLD").then_some(region);
    Ok(FilterOptions {
        filter_name: region
            .as_ref()
            .map_or_else(|| "WORLD".to_string(), |r| r.name.clone()),
        region,
        remove_outliers: filters.remove_outliers,
        model_remove_outliers: filters.model_remove_outliers,
        var_outlier_ranges: filters
            .var_outlier_ranges
            .iter()
            .map(|(var, [low, high])| (var.clone(), (*low, *high)))
            .collect(),
        zeros_to_nan: filters.zeros_to_nan,
    })
}

/// Builds the [`ResampleOptions`] of a setup.
pub fn build_resample_options(resample: &ResampleToml) -> ResampleOptions {
    ResampleOptions {
        min_num_obs: resample.min_num_obs.clone().unwrap_or_default(),
        resample_how: resample.resample_how.clone().unwrap_or_default(),
        var_min_num_obs: resample.var_min_num_obs.clone(),
        var_resample_how: resample.var_resample_how.clone(),
    }
}

/// Builds the [`SpatialOptions`] of a setup.
pub fn build_spatial_options(spatial: &SpatialToml) -> Result<SpatialOptions> {
    if let Some(res) = spatial.regrid_res_deg
        && (res.is_nan() || res <= 0.0)
    {
        bail!("regrid_res_deg must be positive, got {res}");
    }
    let extraction: Extraction = spatial
        .extraction
        .parse()
        .with_context(|| format!("invalid extraction: {:?}", spatial.extraction))?;
    Ok(SpatialOptions {
        regrid_res_deg: spatial.regrid_res_deg,
        extraction,
        vert_which: parse_vert_which(&spatial.vert_which)?,
    })
}

/// Builds the [`ColocationSetup`] of a batch run.
pub fn build_setup(config: &AerocolConfig) -> Result<ColocationSetup> {
    let col = &config.colocation;
    if col.var_pairs.is_empty() {
        bail!("no variable pairs: set [colocation].var_pairs in config");
    }
    let setup = ColocationSetup::new(&config.model.data_id, &config.obs.obs_id)
        .with_var_pairs(col.var_pairs.clone())
        .with_time(build_time_options(&col.time)?)
        .with_filters(build_filter_options(&col.filters)?)
        .with_resample(build_resample_options(&col.resample))
        .with_spatial(build_spatial_options(&col.spatial)?)
        .with_harmonise_units(col.harmonise_units)
        .with_raise_exceptions(col.raise_exceptions);
    setup.validate().context("invalid colocation setup")?;
    Ok(setup)
}

/// Builds a [`GriddedReaderConfig`] from a source's time settings.
pub fn build_gridded_reader_config(
    time_var: &str,
    ts_type: Option<&String>,
) -> Result<GriddedReaderConfig> {
    Ok(GriddedReaderConfig::default()
        .with_time_var(time_var)
        .with_ts_type(optional_ts_type(ts_type)?))
}

/// Builds a [`StationReaderConfig`] from the TOML observation configuration.
pub fn build_station_reader_config(obs: &ObsToml) -> Result<StationReaderConfig> {
    Ok(StationReaderConfig::default()
        .with_station_dim(&obs.station_dim)
        .with_time_var(&obs.time_var)
        .with_dataset(obs.dataset.clone())
        .with_ts_type(optional_ts_type(obs.ts_type.as_ref())?))
}

/// Builds a [`StatisticsConfig`] from the TOML statistics configuration.
pub fn build_statistics_config(stats: &StatisticsToml) -> Result<StatisticsConfig> {
    let mut cfg = StatisticsConfig::new()
        .with_min_num_valid(stats.min_num_valid)
        .with_drop_stats(stats.drop_stats.iter().cloned())
        .with_lowlim(stats.lowlim)
        .with_highlim(stats.highlim);
    if let Some(names) = &stats.statistics {
        let statistics = names
            .iter()
            .map(|n| n.parse::<Statistic>().with_context(|| format!("unknown statistic: {n:?}")))
            .collect::<Result<Vec<_>>>()?;
        cfg = cfg.with_statistics(statistics);
    }
    Ok(cfg)
}

/// Builds an [`EvaluateConfig`] from the TOML statistics configuration.
pub fn build_evaluate_config(stats: &StatisticsToml) -> Result<EvaluateConfig> {
    let mut cfg = EvaluateConfig::default()
        .with_statistics(build_statistics_config(stats)?)
        .with_use_area_weights(stats.use_area_weights)
        .with_station_statistics(stats.station_statistics);
    if let Some(names) = &stats.regions {
        cfg = cfg.with_regions(parse_regions(names)?);
    }
    cfg.validate().context("invalid statistics config")?;
    Ok(cfg)
}

/// Resolves a source's file list: explicit `files`, else every `*.nc` in `dir`.
///
/// Returns `None` when only a directory is given.
pub fn source_files<'a>(
    section: &str,
    dir: Option<&'a Path>,
    files: &[std::path::PathBuf],
) -> Result<Option<&'a Path>> {
    match (dir, files.is_empty()) {
        (Some(_), false) => bail!("[{section}] sets both dir and files"),
        (None, true) => bail!("[{section}] needs dir or files"),
        (Some(d), true) => Ok(Some(d)),
        (None, false) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerocol_tstype::MinNumObs;

    fn config(extra: &str) -> AerocolConfig {
        let text = format!(
            r#"
            [model]
            data_id = "TM5"
            dir = "model"

            [obs]
            obs_id = "EBAS"
            files = ["ebas.nc"]

            [colocation]
            var_pairs = [{{ model_var = "concpm10", obs_var = "concpm10" }}]
            {extra}
            "#
        );
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn test_parse_datetime() {
        let d = parse_datetime("2010-03-01").unwrap();
        assert_eq!(d.to_string(), "2010-03-01 00:00:00");
        let d = parse_datetime("2010-03-01T12:30:00").unwrap();
        assert_eq!(d.to_string(), "2010-03-01 12:30:00");
        assert!(parse_datetime("01.03.2010").is_err());
    }

    #[test]
    fn test_parse_vert_which() {
        assert_eq!(parse_vert_which("surface").unwrap(), VertWhich::Surface);
        assert_eq!(parse_vert_which("Station_Altitude").unwrap(), VertWhich::StationAltitude);
        assert_eq!(parse_vert_which("level:3").unwrap(), VertWhich::Level(3));
        assert!(parse_vert_which("level:x").is_err());
        assert!(parse_vert_which("top").is_err());
    }

    #[test]
    fn test_build_setup_defaults() {
        let setup = build_setup(&config("")).unwrap();
        assert_eq!(setup.model_id(), "TM5");
        assert_eq!(setup.obs_id(), "EBAS");
        assert_eq!(setup.var_pairs().len(), 1);
        assert_eq!(setup.filters().filter_name, "WORLD");
        assert!(setup.filters().region.is_none());
        assert_eq!(setup.resample().min_num_obs, MinNumObs::default());
        assert_eq!(setup.spatial().extraction, Extraction::Nearest);
    }

    #[test]
    fn test_build_setup_sections() {
        let setup = build_setup(&config(
            r#"
            [colocation.time]
            start = "2010-01-01"
            stop = "2010-12-31"
            ts_type = "monthly"

            [colocation.filters]
            region = "europe"
            var_outlier_ranges = { concpm10 = [0.0, 5000.0] }

            [colocation.resample]
            min_num_obs = 5
            "#,
        ))
        .unwrap();
        assert_eq!(setup.time().ts_type.unwrap().to_string(), "monthly");
        assert_eq!(setup.filters().filter_name, "EUROPE");
        assert_eq!(setup.outlier_range("concpm10"), Some((0.0, 5000.0)));
        assert_eq!(setup.resample().min_num_obs, MinNumObs::Fixed(5));
    }

    #[test]
    fn test_build_setup_rejects() {
        let reversed = config("[colocation.time]\nstart = \"2011-01-01\"\nstop = \"2010-01-01\"\n");
        assert!(build_setup(&reversed).is_err());
        let region = config("[colocation.filters]\nregion = \"ATLANTIS\"\n");
        assert!(build_setup(&region).is_err());
        let extraction = config("[colocation.spatial]\nextraction = \"cubic\"\n");
        assert!(build_setup(&extraction).is_err());

        let mut no_pairs = config("");
        no_pairs.colocation.var_pairs.clear();
        assert!(build_setup(&no_pairs).is_err());
    }

    #[test]
    fn test_build_evaluate_config() {
        let stats = StatisticsToml {
            statistics: Some(vec!["R".to_string(), "nmb".to_string()]),
            regions: Some(vec!["EUROPE".to_string()]),
            min_num_valid: 3,
            ..StatisticsToml::default()
        };
        let cfg = build_evaluate_config(&stats).unwrap();
        assert_eq!(cfg.regions().len(), 1);
        assert_eq!(cfg.statistics().statistics().len(), 2);
        assert_eq!(cfg.statistics().min_num_valid(), 3);

        let bad = StatisticsToml {
            statistics: Some(vec!["bogus".to_string()]),
            ..StatisticsToml::default()
        };
        assert!(build_evaluate_config(&bad).is_err());
        let world = StatisticsToml {
            regions: Some(vec!["WORLD".to_string()]),
            ..StatisticsToml::default()
        };
        assert!(build_evaluate_config(&world).is_err());
    }

    #[test]
    fn test_source_files() {
        let dir = Path::new("model");
        assert_eq!(source_files("model", Some(dir), &[]).unwrap(), Some(dir));
        assert!(source_files("model", None, &["a.nc".into()]).unwrap().is_none());
        assert!(source_files("model", None, &[]).is_err());
        assert!(source_files("model", Some(dir), &["a.nc".into()]).is_err());
    }
}
