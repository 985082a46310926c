//! # aerocol-tstype
//!
//! Temporal resolution model: the `ts_type` tag attached to every data
//! object, its ordering and ladder navigation, coverage rules for
//! resampling, and the period arithmetic used to build explicit time
//! indices.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["&str (\"3hourly\", \"MS\")"] -->|"parse()"| B["TsType"]
//!     B -->|".next_lower() / .next_higher()"| B
//!     B -->|"get_min_num_obs()"| C["MinNumObs rules"]
//!     B -->|".floor() / .add_periods()"| D["NaiveDateTime"]
//!     B -->|".time_index()"| E["Vec of period starts"]
//!     F["elapsed seconds"] -->|"infer_from_elapsed()"| B
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use aerocol_tstype::{MinNumObs, TsType};
//!
//! let hourly: TsType = "hourly".parse()?;
//! let daily: TsType = "daily".parse()?;
//! assert!(hourly > daily);
//!
//! // Coverage needed to build one daily value from hourly samples
//! let n = hourly.get_min_num_obs(&daily, &MinNumObs::default_obs())?; // 6
//!
//! // Explicit period index
//! let index = daily.time_index(start, stop)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `tstype` | `BaseFreq`, `TsType`, parsing, ordering, ladder navigation |
//! | `coverage` | Minimum-observation rules |
//! | `index` | Period flooring, shifting and time indices |
//! | `error` | Error types |

mod coverage;
mod error;
mod index;
mod tstype;

pub use coverage::{CoverageRule, MinNumObs};
pub use error::TemporalResolutionError;
pub use tstype::{BaseFreq, MATCH_TOLERANCE, TsType};
