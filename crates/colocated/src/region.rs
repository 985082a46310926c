//! Named latitude/longitude boxes.

use serde::{Deserialize, Serialize};

use crate::error::ColocatedDataError;

/// A rectangular region in degrees.
///
/// Longitude bounds with `lon_range.0 > lon_range.1` describe a box crossing
/// the antimeridian, e.g. `(22.0, -170.0)` spans from 22°E eastwards to 170°W.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub lat_range: (f64, f64),
    pub lon_range: (f64, f64),
}

const PREDEFINED: &[(&str, (f64, f64), (f64, f64))] = &[
    ("WORLD", (-90.0, 90.0), (-180.0, 180.0)),
    ("EUROPE", (30.0, 80.0), (-30.0, 45.0)),
    ("ASIA", (0.0, 80.0), (45.0, 180.0)),
    ("AUSTRALIA", (-50.0, -10.0), (110.0, 160.0)),
    ("CHINA", (18.0, 54.0), (73.0, 135.0)),
    ("INDIA", (6.0, 36.0), (68.0, 98.0)),
    ("NAFRICA", (0.0, 40.0), (-20.0, 50.0)),
    ("SAFRICA", (-35.0, 0.0), (10.0, 40.0)),
    ("SAMERICA", (-60.0, 15.0), (-85.0, -30.0)),
    ("NAMERICA", (15.0, 75.0), (-170.0, -50.0)),
    ("RBU", (29.45, 66.26), (22.0, -170.0)),
];

impl Region {
    /// Creates a custom region.
    pub fn new(name: impl Into<String>, lat_range: (f64, f64), lon_range: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            lat_range,
            lon_range,
        }
    }

    /// Looks up a predefined region by name (case-insensitive).
    pub fn get(name: &str) -> Result<Region, ColocatedDataError> {
        PREDEFINED
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, lat, lon)| Region::new(*n, *lat, *lon))
            .ok_or_else(|| ColocatedDataError::UnknownRegion {
                name: name.to_string(),
            })
    }

    /// Names of all predefined regions.
    pub fn predefined_names() -> impl Iterator<Item = &'static str> {
        PREDEFINED.iter().map(|(n, _, _)| *n)
    }

    /// Default evaluation regions (everything predefined except WORLD).
    pub fn default_regions() -> Vec<Region> {
        PREDEFINED
            .iter()
            .filter(|(n, _, _)| *n != "WORLD")
            .map(|(n, lat, lon)| Region::new(*n, *lat, *lon))
            .collect()
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.lon_range.0 > self.lon_range.1
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.lat_range.0 && lat <= self.lat_range.1
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        let (lo, hi) = self.lon_range;
        if lo <= hi {
            lon >= lo && lon <= hi
        } else {
            lon >= lo || lon <= hi
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.contains_lat(lat) && self.contains_lon(lon)
    }
}
