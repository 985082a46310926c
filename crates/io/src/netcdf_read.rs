//! Low-level NetCDF extraction helpers.

use std::path::Path;

use aerocol_colocated::{decode_cf_times, parse_cf_time_units};
use aerocol_tstype::TsType;
use chrono::NaiveDateTime;
use netcdf::AttributeValue;

use crate::error::IoError;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// First variable whose name is in `aliases`.
pub(crate) fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[String],
) -> Option<netcdf::Variable<'f>> {
    aliases.iter().find_map(|alias| file.variable(alias))
}

/// Read a 1-D `f64` variable, trying each alias in order.
///
/// Returns the data from the first alias that matches. If none match,
/// returns [`IoError::MissingVariable`] with the first alias as the name.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[String],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    match find_variable(file, aliases) {
        Some(var) => Ok(var.get_values::<f64, _>(..)?),
        None => Err(IoError::MissingVariable {
            name: aliases.first().cloned().unwrap_or_else(|| "unknown".to_string()),
            path: path.to_path_buf(),
        }),
    }
}

/// Read the time coordinate and decode it with its CF `units` attribute.
pub(crate) fn read_time(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<Vec<NaiveDateTime>, IoError> {
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::MissingVariable {
            name: time_var.to_string(),
            path: path.to_path_buf(),
        })?;

    let units: String = var
        .attribute_value("units")
        .ok_or_else(|| IoError::InvalidTime {
            reason: format!("time variable '{time_var}' has no 'units' attribute"),
        })?
        .map_err(|e| IoError::InvalidTime {
            reason: format!("failed to read 'units' attribute: {e}"),
        })?
        .try_into()
        .map_err(|e: netcdf::Error| IoError::InvalidTime {
            reason: format!("'units' attribute is not a string: {e}"),
        })?;

    let units = parse_cf_time_units(&units)?;
    Ok(decode_cf_times(&var.get_values::<f64, _>(..)?, &units)?)
}

/// Global string attribute, `None` if absent.
pub(crate) fn global_string(file: &netcdf::File, name: &str) -> Result<Option<String>, IoError> {
    let Some(attr) = file.attribute(name) else {
        return Ok(None);
    };
    let value: String = attr
        .value()?
        .try_into()
        .map_err(|e: netcdf::Error| IoError::InvalidAttribute {
            name: name.to_string(),
            reason: format!("not a string: {e}"),
        })?;
    Ok(Some(value))
}

/// Variable string attribute, `None` if absent or not a string.
pub(crate) fn var_string(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Global attribute holding a JSON list of strings.
pub(crate) fn global_json_list(
    file: &netcdf::File,
    name: &str,
) -> Result<Option<Vec<String>>, IoError> {
    let Some(json) = global_string(file, name)? else {
        return Ok(None);
    };
    let list = serde_json::from_str(&json).map_err(|e| IoError::InvalidAttribute {
        name: name.to_string(),
        reason: format!("not a JSON list of strings: {e}"),
    })?;
    Ok(Some(list))
}

fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|x| f64::from(*x)),
        _ => None,
    }
}

/// Read all values of `var` with `_FillValue` and `missing_value` set to NaN.
pub(crate) fn read_masked(var: &netcdf::Variable<'_>) -> Result<Vec<f64>, IoError> {
    let fills: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| numeric_attribute(var, name))
        .collect();
    let mut values = var.get_values::<f64, _>(..)?;
    if !fills.is_empty() {
        for v in values.iter_mut() {
            if fills.contains(v) {
                *v = f64::NAN;
            }
        }
    }
    Ok(values)
}

/// Dimension names of `var`, in order.
pub(crate) fn dimension_names(var: &netcdf::Variable<'_>) -> Vec<String> {
    var.dimensions().iter().map(|d| d.name()).collect()
}

/// Infers the resolution from the median spacing of `time`.
pub(crate) fn infer_ts_type(time: &[NaiveDateTime]) -> Result<TsType, IoError> {
    let mut steps: Vec<f64> = time
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64)
        .collect();
    if steps.is_empty() {
        return Err(IoError::InvalidTime {
            reason: "cannot infer ts_type from fewer than two time steps".to_string(),
        });
    }
    steps.sort_by(f64::total_cmp);
    Ok(TsType::infer_from_elapsed(steps[steps.len() / 2])?)
}
