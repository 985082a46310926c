//! Time-indexed value series.

use chrono::NaiveDateTime;

use crate::error::ResampleError;

/// Values on strictly increasing timestamps. NaN marks a missing sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    time: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a series, validating lengths and ordering.
    pub fn new(time: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, ResampleError> {
        if values.len() != time.len() {
            return Err(ResampleError::LengthMismatch {
                field: "values",
                expected: time.len(),
                got: values.len(),
            });
        }
        if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ResampleError::Unsorted { index: i + 1 });
        }
        Ok(Self { time, values })
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of non-NaN values.
    pub fn num_valid(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn into_parts(self) -> (Vec<NaiveDateTime>, Vec<f64>) {
        (self.time, self.values)
    }

    /// Restricts the series to `[start, stop]`.
    pub fn crop(&self, start: NaiveDateTime, stop: NaiveDateTime) -> TimeSeries {
        let (time, values) = self
            .time
            .iter()
            .zip(&self.values)
            .filter(|(t, _)| **t >= start && **t <= stop)
            .map(|(t, v)| (*t, *v))
            .unzip();
        TimeSeries { time, values }
    }

    /// Value at exactly `t`, if present.
    pub fn value_at(&self, t: NaiveDateTime) -> Option<f64> {
        self.time
            .binary_search(&t)
            .ok()
            .map(|i| self.values[i])
    }

    /// Re-indexes onto `index`; timestamps absent from the series become NaN.
    pub fn reindex(&self, index: &[NaiveDateTime]) -> Vec<f64> {
        index
            .iter()
            .map(|t| self.value_at(*t).unwrap_or(f64::NAN))
            .collect()
    }
}

/// Sets both slices to NaN wherever either is NaN.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn mask_jointly(a: &mut [f64], b: &mut [f64]) {
    assert_eq!(a.len(), b.len(), "mask_jointly: length mismatch");
    for (x, y) in a.iter_mut().zip(b.iter_mut()) {
        if x.is_nan() || y.is_nan() {
            *x = f64::NAN;
            *y = f64::NAN;
        }
    }
}
