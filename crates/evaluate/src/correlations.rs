//! Rolled-up correlations: per time step across space, per point across time.

use aerocol_colocated::{ColocatedData, ColocatedDataError};
use aerocol_stats::{StatsDict, nanmean, nanmedian, pearson};
use ndarray::{Array3, ArrayView1, Axis};

/// Pearson R of the jointly valid pairs of two lanes, NaN with fewer than
/// `min_valid` pairs.
fn lane_r(reference: ArrayView1<'_, f64>, model: ArrayView1<'_, f64>, min_valid: usize) -> f64 {
    let (r, m): (Vec<f64>, Vec<f64>) = reference
        .iter()
        .zip(model.iter())
        .filter(|(r, m)| !r.is_nan() && !m.is_nan())
        .map(|(r, m)| (*r, *m))
        .unzip();
    if r.len() < min_valid.max(2) {
        return f64::NAN;
    }
    pearson(&m, &r, None)
}

/// Correlation across points at every time step of a `(2, time, point)` array.
pub fn spatial_r_per_timestep(flat: &Array3<f64>, min_valid: usize) -> Vec<f64> {
    let (reference, model) = (flat.index_axis(Axis(0), 0), flat.index_axis(Axis(0), 1));
    reference
        .outer_iter()
        .zip(model.outer_iter())
        .map(|(r, m)| lane_r(r, m, min_valid))
        .collect()
}

/// Correlation across time at every point of a `(2, time, point)` array.
pub fn temporal_r_per_point(flat: &Array3<f64>, min_valid: usize) -> Vec<f64> {
    let (reference, model) = (flat.index_axis(Axis(0), 0), flat.index_axis(Axis(0), 1));
    reference
        .axis_iter(Axis(1))
        .zip(model.axis_iter(Axis(1)))
        .map(|(r, m)| lane_r(r, m, min_valid))
        .collect()
}

/// Adds `R_spatial_mean`, `R_spatial_median`, `R_temporal_mean` and
/// `R_temporal_median` to `stats`.
pub fn add_rolled_up(
    stats: &mut StatsDict,
    coldata: &ColocatedData,
    min_valid: usize,
) -> Result<(), ColocatedDataError> {
    let flat = coldata.flat()?;
    let spatial = spatial_r_per_timestep(&flat, min_valid);
    let temporal = temporal_r_per_point(&flat, min_valid);
    stats.insert("R_spatial_mean", nanmean(&spatial));
    stats.insert("R_spatial_median", nanmedian(&spatial));
    stats.insert("R_temporal_mean", nanmean(&temporal));
    stats.insert("R_temporal_median", nanmedian(&temporal));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Three time steps, three points; model equals reference at t=0 and
    /// reversed at t=1, t=2 has one valid pair.
    fn sample() -> Array3<f64> {
        let reference = [[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, f64::NAN, f64::NAN]];
        let model = [[2.0, 4.0, 6.0], [3.0, 2.0, 1.0], [5.0, 5.0, 5.0]];
        Array3::from_shape_fn((2, 3, 3), |(v, t, p)| {
            if v == 0 { reference[t][p] } else { model[t][p] }
        })
    }

    #[test]
    fn spatial_per_timestep() {
        let r = spatial_r_per_timestep(&sample(), 1);
        assert_relative_eq!(r[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], -1.0, epsilon = 1e-12);
        assert!(r[2].is_nan());
    }

    #[test]
    fn temporal_per_point() {
        let r = temporal_r_per_point(&sample(), 1);
        // Point 1 has two valid steps with reference constant: undefined.
        assert!(r[1].is_nan());
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn min_valid_applies() {
        let r = spatial_r_per_timestep(&sample(), 4);
        assert!(r.iter().all(|v| v.is_nan()));
    }
}
