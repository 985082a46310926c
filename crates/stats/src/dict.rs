//! Ordered statistics result.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key of the raw input length.
pub const TOTNUM: &str = "totnum";
/// Key of the weighting flag.
pub const WEIGHTED: &str = "weighted";
/// Key of the valid pair count.
pub const NUM_VALID: &str = "num_valid";

/// Rolled-up correlation keys carried by every placeholder dict.
pub const ROLLED_UP_KEYS: [&str; 4] = [
    "R_spatial_mean",
    "R_spatial_median",
    "R_temporal_mean",
    "R_temporal_median",
];

/// Ordered statistic name to value mapping.
///
/// Values are NaN where a statistic is undefined; the key is still present.
/// The `weighted` flag is kept beside the numeric entries and is `None` only
/// in placeholder dicts. Serialises as a JSON object in insertion order with
/// NaN written as `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsDict {
    entries: Vec<(String, f64)>,
    weighted: Option<bool>,
}

impl StatsDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        name == WEIGHTED || self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn weighted(&self) -> Option<bool> {
        self.weighted
    }

    pub fn set_weighted(&mut self, weighted: Option<bool>) {
        self.weighted = weighted;
    }

    /// Total raw pair count, NaN in placeholders.
    pub fn totnum(&self) -> f64 {
        self.get(TOTNUM).unwrap_or(f64::NAN)
    }

    /// Valid pair count after filtering, NaN in placeholders.
    pub fn num_valid(&self) -> f64 {
        self.get(NUM_VALID).unwrap_or(f64::NAN)
    }

    /// All keys, `weighted` included after `totnum`.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.entries.len() + 1);
        for (i, (k, _)) in self.entries.iter().enumerate() {
            keys.push(k.as_str());
            if i == 0 {
                keys.push(WEIGHTED);
            }
        }
        if self.entries.is_empty() {
            keys.push(WEIGHTED);
        }
        keys
    }

    /// Numeric entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of keys, `weighted` included.
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Overwrites every value with NaN and clears the weighting flag.
    pub fn fill_nan(&mut self) {
        for entry in &mut self.entries {
            entry.1 = f64::NAN;
        }
        self.weighted = None;
    }
}

impl Serialize for StatsDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        let as_opt = |v: f64| if v.is_nan() { None } else { Some(v) };
        for (i, (k, v)) in self.entries.iter().enumerate() {
            map.serialize_entry(k, &as_opt(*v))?;
            if i == 0 {
                map.serialize_entry(WEIGHTED, &self.weighted)?;
            }
        }
        if self.entries.is_empty() {
            map.serialize_entry(WEIGHTED, &self.weighted)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces() {
        let mut d = StatsDict::new();
        d.insert("totnum", 3.0);
        d.insert("num_valid", 2.0);
        d.insert("totnum", 4.0);
        assert_eq!(d.keys(), vec!["totnum", "weighted", "num_valid"]);
        assert_eq!(d.totnum(), 4.0);
    }

    #[test]
    fn serialises_nan_as_null() {
        let mut d = StatsDict::new();
        d.insert("totnum", 1.0);
        d.insert("R", f64::NAN);
        d.set_weighted(Some(false));
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"totnum":1.0,"weighted":false,"R":null}"#);
    }

    #[test]
    fn fill_nan_clears_weighted() {
        let mut d = StatsDict::new();
        d.insert("totnum", 1.0);
        d.set_weighted(Some(true));
        d.fill_nan();
        assert!(d.totnum().is_nan());
        assert_eq!(d.weighted(), None);
    }
}
