//! Extraction of grid values at station coordinates.

use std::fmt;
use std::str::FromStr;

use ndarray::s;

use crate::error::ColocateError;
use crate::gridded::GriddedData;

/// How grid values are sampled at a station location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extraction {
    /// Value of the closest cell centre.
    #[default]
    Nearest,
    /// Bilinear interpolation between the four surrounding centres.
    Bilinear,
}

impl Extraction {
    pub fn name(self) -> &'static str {
        match self {
            Extraction::Nearest => "nearest",
            Extraction::Bilinear => "bilinear",
        }
    }
}

impl FromStr for Extraction {
    type Err = ColocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Extraction::Nearest),
            "bilinear" | "linear" => Ok(Extraction::Bilinear),
            other => Err(ColocateError::Setup {
                reason: format!("unknown extraction method '{other}', choose nearest or bilinear"),
            }),
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed longitude difference `a - b` in `[-180, 180)`.
fn lon_diff(a: f64, b: f64) -> f64 {
    (a - b + 540.0).rem_euclid(360.0) - 180.0
}

fn nearest_lat(lat: &[f64], v: f64) -> usize {
    nearest_by(lat, |c| (c - v).abs())
}

fn nearest_lon(lon: &[f64], v: f64) -> usize {
    nearest_by(lon, |c| lon_diff(c, v).abs())
}

fn nearest_by(coords: &[f64], dist: impl Fn(f64) -> f64) -> usize {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| dist(**a).total_cmp(&dist(**b)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Bracketing indices and the weight of the upper one along latitude.
fn bracket_lat(lat: &[f64], v: f64) -> Vec<(usize, f64)> {
    let n = lat.len();
    if n == 1 || v <= lat[0] {
        return vec![(0, 1.0)];
    }
    if v >= lat[n - 1] {
        return vec![(n - 1, 1.0)];
    }
    let hi = lat.partition_point(|c| *c <= v).min(n - 1);
    let lo = hi - 1;
    let w = (v - lat[lo]) / (lat[hi] - lat[lo]);
    vec![(lo, 1.0 - w), (hi, w)]
}

/// Bracketing indices along a possibly periodic longitude axis.
fn bracket_lon(lon: &[f64], v: f64) -> Vec<(usize, f64)> {
    let n = lon.len();
    if n == 1 {
        return vec![(0, 1.0)];
    }
    let spacing = (lon[n - 1] - lon[0]) / (n - 1) as f64;
    let global = lon[n - 1] - lon[0] + spacing >= 359.9;
    let rel = (v - lon[0]).rem_euclid(360.0);
    let span = lon[n - 1] - lon[0];
    if rel <= span {
        let target = lon[0] + rel;
        let hi = lon.partition_point(|c| *c <= target).min(n - 1);
        if hi == 0 || lon[hi] == target {
            return vec![(hi, 1.0)];
        }
        let lo = hi - 1;
        let w = (target - lon[lo]) / (lon[hi] - lon[lo]);
        return vec![(lo, 1.0 - w), (hi, w)];
    }
    if global {
        let gap = 360.0 - span;
        let w = (rel - span) / gap;
        return vec![(n - 1, 1.0 - w), (0, w)];
    }
    vec![(nearest_lon(lon, v), 1.0)]
}

/// Time series of `field` at `(lat, lon)` on `level`.
///
/// Bilinear weights are renormalised over the valid corners of each time
/// step, so a NaN corner does not blank the station.
pub fn extract_series(
    field: &GriddedData,
    lat: f64,
    lon: f64,
    level: usize,
    method: Extraction,
) -> Result<Vec<f64>, ColocateError> {
    if level >= field.num_levels() {
        return Err(ColocateError::DataDimension {
            reason: format!("level {level} out of range (0..{})", field.num_levels()),
        });
    }
    let (glat, glon) = (field.latitude(), field.longitude());
    if glat.is_empty() || glon.is_empty() {
        return Err(ColocateError::DataDimension {
            reason: format!("'{}' has an empty grid", field.data_id()),
        });
    }
    let data = field.data().slice(s![.., level, .., ..]);
    match method {
        Extraction::Nearest => {
            let (i, j) = (nearest_lat(glat, lat), nearest_lon(glon, lon));
            Ok(data.slice(s![.., i, j]).to_vec())
        }
        Extraction::Bilinear => {
            let corners: Vec<(usize, usize, f64)> = bracket_lat(glat, lat)
                .into_iter()
                .flat_map(|(i, wi)| {
                    bracket_lon(glon, lon)
                        .into_iter()
                        .map(move |(j, wj)| (i, j, wi * wj))
                })
                .filter(|(_, _, w)| *w > 0.0)
                .collect();
            Ok(data
                .outer_iter()
                .map(|plane| {
                    let (sum, wsum) = corners
                        .iter()
                        .map(|&(i, j, w)| (plane[[i, j]], w))
                        .filter(|(v, _)| !v.is_nan())
                        .fold((0.0, 0.0), |(s, ws), (v, w)| (s + v * w, ws + w));
                    if wsum > 0.0 { sum / wsum } else { f64::NAN }
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::Array3;

    fn field() -> GriddedData {
        let t = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let lat = vec![-45.0, 0.0, 45.0];
        let lon: Vec<f64> = (0..4).map(|k| 45.0 + 90.0 * k as f64).collect();
        GriddedData::surface(
            "m",
            "v",
            "daily".parse().unwrap(),
            vec![t],
            lat,
            lon,
            Array3::from_shape_fn((1, 3, 4), |(_, i, j)| (10 * i + j) as f64),
        )
        .unwrap()
    }

    #[test]
    fn nearest_cell() {
        let v = extract_series(&field(), 40.0, 130.0, 0, Extraction::Nearest).unwrap();
        assert_eq!(v, vec![21.0]);
    }

    #[test]
    fn nearest_wraps_longitude() {
        let v = extract_series(&field(), 0.0, -40.0, 0, Extraction::Nearest).unwrap();
        assert_eq!(v, vec![13.0]);
    }

    #[test]
    fn bilinear_midpoint() {
        let v = extract_series(&field(), 22.5, 90.0, 0, Extraction::Bilinear).unwrap();
        assert_relative_eq!(v[0], 15.5, epsilon = 1e-12);
    }

    #[test]
    fn bilinear_across_seam() {
        // Halfway between 315 and 45 (= 405).
        let v = extract_series(&field(), 0.0, 0.0, 0, Extraction::Bilinear).unwrap();
        assert_relative_eq!(v[0], 11.5, epsilon = 1e-12);
    }

    #[test]
    fn parse_method() {
        assert_eq!("bilinear".parse::<Extraction>().unwrap(), Extraction::Bilinear);
        assert!("cubic".parse::<Extraction>().is_err());
    }
}
