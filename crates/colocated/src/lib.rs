//! # aerocol-colocated
//!
//! The paired reference/model container produced by colocation, with its
//! statistics, filters, temporal resampling and persistence.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     A["Array3 / Array4 + coords"] -->|"point() / grid()"| B["ColocatedData"]
//!     F[".nc file"] -->|"read_netcdf()"| B
//!     B -->|"to_netcdf()"| F
//!     B -->|"resample_time() / mda8()"| B
//!     B -->|"filter_region() / apply_latlon_filter()"| B
//!     B -->|"calc_statistics()"| S["StatsDict"]
//!     B <-->|"to_table() / from_table()"| T["ColocatedTable"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use aerocol_colocated::{ColocatedData, TimeResampleOptions};
//! use aerocol_stats::StatisticsConfig;
//!
//! let cd = ColocatedData::read_netcdf(path)?;
//! let europe = cd.filter_region("EUROPE", false)?;
//! let monthly = europe.resample_time(&TimeResampleOptions::new("monthly".parse()?))?;
//! let stats = monthly.calc_statistics(false, &StatisticsConfig::new())?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `colocated` | `ColocatedData`, properties and statistics |
//! | `ops` | Resampling, region filters, value edits, MDA8 |
//! | `meta` | `ColocationMeta` provenance record |
//! | `region` | Predefined and custom lat/lon regions |
//! | `filename` | Naming template of saved files |
//! | `netcdf_io` | NetCDF read/write |
//! | `table` | Long-format rows for station data |
//! | `cf_time` | CF time unit parsing and encoding |
//! | `error` | Error types |

mod cf_time;
mod colocated;
mod error;
mod filename;
mod meta;
mod netcdf_io;
mod ops;
mod region;
mod table;

pub use cf_time::{CF_TIME_UNITS, CfTimeUnits, decode_cf_times, encode_cf_times, parse_cf_time_units};
pub use colocated::{ColocatedData, Layout, NUM_COORDS_TOT, NUM_COORDS_WITH_DATA};
pub use error::ColocatedDataError;
pub use filename::FilenameMeta;
pub use meta::{ColocationMeta, VerticalLayer};
pub use netcdf_io::get_meta_from_filename;
pub use ops::TimeResampleOptions;
pub use region::Region;
pub use table::{ColocatedTable, TableRow};
