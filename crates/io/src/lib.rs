//! # aerocol-io
//!
//! Read model fields and station observations from CF NetCDF files and
//! expose them through the source traits of `aerocol-colocate`.
//!
//! ```ignore
//! use aerocol_io::{GriddedReaderConfig, NetcdfGriddedSource};
//!
//! let model = NetcdfGriddedSource::from_dir("TM5", dir, GriddedReaderConfig::default())?;
//! ```

mod error;
mod gridded;
mod netcdf_read;
mod station;

pub use error::IoError;
pub use gridded::{GriddedReaderConfig, NetcdfGriddedSource, concat_time, read_gridded};
pub use station::{NetcdfUngriddedSource, StationReaderConfig, read_stations};
