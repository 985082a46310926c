//! Registry of convertible unit aliases.

use crate::error::ColocateError;

/// Physical dimension of a registered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    MassConcentration,
    MixingRatio,
    Extinction,
    Dimensionless,
}

/// `(alias, dimension, factor to the dimension's base unit)`
const REGISTRY: &[(&str, Dimension, f64)] = &[
    ("ug m-3", Dimension::MassConcentration, 1.0),
    ("ug/m3", Dimension::MassConcentration, 1.0),
    ("µg m-3", Dimension::MassConcentration, 1.0),
    ("ng m-3", Dimension::MassConcentration, 1e-3),
    ("ng/m3", Dimension::MassConcentration, 1e-3),
    ("mg m-3", Dimension::MassConcentration, 1e3),
    ("mg/m3", Dimension::MassConcentration, 1e3),
    ("ppb", Dimension::MixingRatio, 1.0),
    ("ppbv", Dimension::MixingRatio, 1.0),
    ("nmol mol-1", Dimension::MixingRatio, 1.0),
    ("ppm", Dimension::MixingRatio, 1e3),
    ("ppmv", Dimension::MixingRatio, 1e3),
    ("umol mol-1", Dimension::MixingRatio, 1e3),
    ("ppt", Dimension::MixingRatio, 1e-3),
    ("pptv", Dimension::MixingRatio, 1e-3),
    ("m-1", Dimension::Extinction, 1.0),
    ("1/m", Dimension::Extinction, 1.0),
    ("km-1", Dimension::Extinction, 1e-3),
    ("1/km", Dimension::Extinction, 1e-3),
    ("Mm-1", Dimension::Extinction, 1e-6),
    ("1/Mm", Dimension::Extinction, 1e-6),
    ("1", Dimension::Dimensionless, 1.0),
    ("dimensionless", Dimension::Dimensionless, 1.0),
    ("", Dimension::Dimensionless, 1.0),
];

fn lookup(unit: &str) -> Option<(Dimension, f64)> {
    let unit = unit.trim();
    REGISTRY
        .iter()
        .find(|(alias, _, _)| *alias == unit)
        .map(|(_, dim, f)| (*dim, *f))
}

/// Multiplicative factor converting values in `from` to `to`.
///
/// Identical strings convert with factor 1 even if unregistered.
pub fn conversion_factor(from: &str, to: &str) -> Result<f64, ColocateError> {
    if from.trim() == to.trim() {
        return Ok(1.0);
    }
    match (lookup(from), lookup(to)) {
        (Some((d1, f1)), Some((d2, f2))) if d1 == d2 => Ok(f1 / f2),
        _ => Err(ColocateError::DataUnit {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// Converts `values` in place from `from` to `to`.
pub fn convert_values(values: &mut [f64], from: &str, to: &str) -> Result<(), ColocateError> {
    let factor = conversion_factor(from, to)?;
    if factor != 1.0 {
        values.iter_mut().for_each(|v| *v *= factor);
    }
    Ok(())
}
