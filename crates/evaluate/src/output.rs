//! JSON output structures for evaluation results.

use aerocol_colocated::ColocationMeta;
use aerocol_stats::StatsDict;
use serde::Serialize;

use crate::error::EvaluateError;

/// Top-level evaluation output.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutput {
    /// Metadata of the evaluated container.
    pub meta: ColocationMeta,
    /// WORLD first, then the configured regions in order.
    pub regions: Vec<RegionStats>,
    /// Per-station statistics; empty for gridded data.
    pub stations: Vec<StationStats>,
}

impl EvaluationOutput {
    /// Statistics of the region called `name`.
    pub fn region(&self, name: &str) -> Option<&RegionStats> {
        self.regions.iter().find(|r| r.region == name)
    }
}

/// Statistics of one region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionStats {
    pub region: String,
    /// Set when the region had no data and `stats` is a placeholder.
    pub dummy: bool,
    pub stats: StatsDict,
}

/// Statistics of one station's time series.
#[derive(Debug, Clone, Serialize)]
pub struct StationStats {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub country: Option<String>,
    pub stats: StatsDict,
}

/// Serialize evaluation output to a JSON string.
pub fn to_json(output: &EvaluationOutput) -> Result<String, EvaluateError> {
    serde_json::to_string_pretty(output).map_err(|e| EvaluateError::Serialization {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_writes_nan_as_null() {
        let mut stats = StatsDict::new();
        stats.insert("totnum", 4.0);
        stats.insert("R", f64::NAN);
        let output = EvaluationOutput {
            meta: ColocationMeta::new("EBAS", "TM5", "concpm10", "concpm10"),
            regions: vec![RegionStats {
                region: "WORLD".to_string(),
                dummy: false,
                stats,
            }],
            stations: vec![],
        };

        let json = to_json(&output).unwrap();
        assert!(json.contains("\"region\": \"WORLD\""));
        assert!(json.contains("\"R\": null"));
        assert!(json.contains("\"stations\": []"));
        assert!(output.region("WORLD").is_some());
        assert!(output.region("EUROPE").is_none());
    }

    #[test]
    fn test_station_stats_serializes() {
        let entry = StationStats {
            station_name: "Ispra".to_string(),
            latitude: 45.8,
            longitude: 8.6,
            altitude: Some(209.0),
            country: None,
            stats: StatsDict::new(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"station_name\":\"Ispra\""));
        assert!(json.contains("\"altitude\":209.0"));
        assert!(json.contains("\"country\":null"));
    }
}
