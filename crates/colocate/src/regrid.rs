//! Area-conservative regridding between regular latitude/longitude grids.

use ndarray::{Array4, s};
use tracing::debug;

use crate::error::ColocateError;
use crate::gridded::GriddedData;

/// Non-zero overlaps of one target index: `(source index, weight)`.
type Overlaps = Vec<Vec<(usize, f64)>>;

/// Cell edges derived from ascending centres.
fn edges(centres: &[f64], full: (f64, f64)) -> Vec<f64> {
    let n = centres.len();
    if n == 1 {
        let half = (full.1 - full.0) / 2.0;
        return vec![centres[0] - half, centres[0] + half];
    }
    let mut e = Vec::with_capacity(n + 1);
    e.push(centres[0] - (centres[1] - centres[0]) / 2.0);
    for w in centres.windows(2) {
        e.push((w[0] + w[1]) / 2.0);
    }
    e.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);
    e
}

fn lat_edges(centres: &[f64]) -> Vec<f64> {
    edges(centres, (-90.0, 90.0))
        .into_iter()
        .map(|v| v.clamp(-90.0, 90.0))
        .collect()
}

fn lat_overlaps(src: &[f64], dst: &[f64]) -> Overlaps {
    let se = lat_edges(src);
    let de = lat_edges(dst);
    (0..dst.len())
        .map(|d| {
            (0..src.len())
                .filter_map(|s| {
                    let lo = se[s].max(de[d]);
                    let hi = se[s + 1].min(de[d + 1]);
                    (hi > lo).then(|| (s, hi.to_radians().sin() - lo.to_radians().sin()))
                })
                .collect()
        })
        .collect()
}

fn lon_overlaps(src: &[f64], dst: &[f64]) -> Overlaps {
    let se = edges(src, (0.0, 360.0));
    let de = edges(dst, (0.0, 360.0));
    (0..dst.len())
        .map(|d| {
            (0..src.len())
                .filter_map(|s| {
                    let w: f64 = [-360.0, 0.0, 360.0]
                        .iter()
                        .map(|shift| {
                            let lo = (se[s] + shift).max(de[d]);
                            let hi = (se[s + 1] + shift).min(de[d + 1]);
                            (hi - lo).max(0.0)
                        })
                        .sum();
                    (w > 0.0).then_some((s, w))
                })
                .collect()
        })
        .collect()
}

/// Regrids `field` onto the cell centres `latitude` x `longitude`.
///
/// Each target cell is the area-weighted mean of the overlapping source
/// cells, ignoring NaN. Cells without valid overlap are NaN.
pub fn regrid(
    field: &GriddedData,
    latitude: &[f64],
    longitude: &[f64],
) -> Result<GriddedData, ColocateError> {
    if field.latitude() == latitude && field.longitude() == longitude {
        return Ok(field.clone());
    }
    if latitude.is_empty() || longitude.is_empty() {
        return Err(ColocateError::DataDimension {
            reason: "target grid is empty".to_string(),
        });
    }
    let wlat = lat_overlaps(field.latitude(), latitude);
    let wlon = lon_overlaps(field.longitude(), longitude);
    let src = field.data();
    let (nt, nlev, _, _) = src.dim();
    let mut out = Array4::<f64>::from_elem((nt, nlev, latitude.len(), longitude.len()), f64::NAN);
    for t in 0..nt {
        for l in 0..nlev {
            let plane = src.slice(s![t, l, .., ..]);
            for (i, lat_w) in wlat.iter().enumerate() {
                for (j, lon_w) in wlon.iter().enumerate() {
                    let mut sum = 0.0;
                    let mut wsum = 0.0;
                    for &(si, wi) in lat_w {
                        for &(sj, wj) in lon_w {
                            let v = plane[[si, sj]];
                            if !v.is_nan() {
                                sum += wi * wj * v;
                                wsum += wi * wj;
                            }
                        }
                    }
                    if wsum > 0.0 {
                        out[[t, l, i, j]] = sum / wsum;
                    }
                }
            }
        }
    }
    debug!(
        data_id = field.data_id(),
        from = ?field.grid_shape(),
        to = ?(latitude.len(), longitude.len()),
        "regridded field"
    );
    Ok(field.with_grid(latitude.to_vec(), longitude.to_vec(), out))
}

/// Global grid centres at resolution `res_deg`.
pub fn global_grid(res_deg: f64) -> Result<(Vec<f64>, Vec<f64>), ColocateError> {
    if !(res_deg > 0.0 && res_deg <= 180.0) {
        return Err(ColocateError::Setup {
            reason: format!("regrid_res_deg must be in (0, 180], got {res_deg}"),
        });
    }
    let centres = |lo: f64, hi: f64| -> Vec<f64> {
        let n = ((hi - lo) / res_deg).round().max(1.0) as usize;
        (0..n).map(|k| lo + res_deg * (k as f64 + 0.5)).collect()
    };
    Ok((centres(-90.0, 90.0), centres(-180.0, 180.0)))
}

/// Regrids `field` onto a global grid of resolution `res_deg`.
pub fn regrid_res_deg(field: &GriddedData, res_deg: f64) -> Result<GriddedData, ColocateError> {
    let (lat, lon) = global_grid(res_deg)?;
    regrid(field, &lat, &lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::Array3;

    fn field(lat: Vec<f64>, lon: Vec<f64>, f: impl Fn(usize, usize) -> f64) -> GriddedData {
        let (nlat, nlon) = (lat.len(), lon.len());
        let t = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        GriddedData::surface(
            "m",
            "v",
            "monthly".parse().unwrap(),
            vec![t],
            lat,
            lon,
            Array3::from_shape_fn((1, nlat, nlon), |(_, i, j)| f(i, j)),
        )
        .unwrap()
    }

    #[test]
    fn constant_field_preserved() {
        let (lat, lon) = global_grid(10.0).unwrap();
        let f = field(lat, lon, |_, _| 3.0);
        let out = regrid_res_deg(&f, 30.0).unwrap();
        assert_eq!(out.grid_shape(), (6, 12));
        assert!(out.data().iter().all(|v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn area_weighted_mean() {
        // Two source cells on the equator band, one NaN.
        let f = field(vec![-45.0, 45.0], vec![0.0, 180.0], |i, j| {
            if i == 0 && j == 1 { f64::NAN } else { (i * 2 + j) as f64 }
        });
        let out = regrid(&f, &[0.0], &[90.0]).unwrap();
        // Valid cells 0, 2, 3 with equal area.
        assert_relative_eq!(out.data()[[0, 0, 0, 0]], 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn longitude_conventions_mix() {
        let src = field(vec![0.0], vec![90.0, 270.0], |_, j| j as f64);
        let out = regrid(&src, &[0.0], &[-90.0, 90.0]).unwrap();
        assert_relative_eq!(out.data()[[0, 0, 0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[0, 0, 0, 1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bad_resolution() {
        assert!(matches!(global_grid(0.0), Err(ColocateError::Setup { .. })));
    }
}
