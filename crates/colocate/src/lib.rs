//! # aerocol-colocate
//!
//! Colocation of gridded model fields with gridded or station observations,
//! producing [`ColocatedData`](aerocol_colocated::ColocatedData) containers.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     M["GriddedSource (model)"] -->|"read_var()"| G["GriddedData"]
//!     O["ObsSource"] -->|"Gridded"| OG["GriddedData"]
//!     O -->|"Ungridded"| OS["Vec&lt;StationData&gt;"]
//!     G --> GG["colocate_gridded_gridded()"]
//!     OG --> GG
//!     G --> GU["colocate_gridded_ungridded()"]
//!     OS --> GU
//!     G --> VP["colocate_vertical_profile()"]
//!     OS --> VP
//!     GG --> C["ColocatedData"]
//!     GU --> C
//!     VP --> L["ColocatedDataLists"]
//!     S["ColocationSetup"] --> R["Colocator::run()"]
//!     R --> GG
//!     R --> GU
//!     R --> CR["ColocationRun (results + status)"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use aerocol_colocate::{ColocationSetup, Colocator, ObsSource, VarPair};
//!
//! let setup = ColocationSetup::new("TM5", "EBAS")
//!     .with_var_pair(VarPair::new("concpm10", "concpm10"));
//! let mut colocator = Colocator::new(setup, Box::new(model), ObsSource::Ungridded(Box::new(obs)));
//! let run = colocator.run()?;
//! run.save_all(out_dir)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `gridded` | `GriddedData` field with time, level and region operations |
//! | `station` | `StationData` series and `StationProfile` |
//! | `source` | Source traits, `ObsSource` tag, in-memory sources |
//! | `units` | Unit registry and conversion |
//! | `regrid` | Area-conservative regridding |
//! | `extract` | Nearest and bilinear station extraction |
//! | `options` | Per-call `ColocationOptions` |
//! | `setup` | Batch `ColocationSetup` |
//! | `gridded_gridded` | Gridded vs gridded colocation |
//! | `gridded_ungridded` | Gridded vs station colocation |
//! | `climatology` | Monthly observation climatology |
//! | `profile` | Vertical profile colocation |
//! | `colocator` | Batch runner and status table |
//! | `error` | Error types |

mod align;
mod climatology;
mod colocator;
mod error;
mod extract;
mod gridded;
mod gridded_gridded;
mod gridded_ungridded;
mod options;
mod profile;
mod regrid;
mod setup;
mod source;
mod station;
mod units;

pub use climatology::{monthly_climatology, stations_to_climatology};
pub use colocator::{ColocationRun, Colocator, FailureReason, PairResult, PairStatus};
pub use error::ColocateError;
pub use extract::{Extraction, extract_series};
pub use gridded::GriddedData;
pub use gridded_gridded::{colocate_gridded_gridded, stack_gridded};
pub use gridded_ungridded::colocate_gridded_ungridded;
pub use options::{ClimatologyOptions, ColocationOptions};
pub use profile::{ColocatedDataLists, LayerSpec, colocate_vertical_profile};
pub use regrid::{global_grid, regrid, regrid_res_deg};
pub use setup::{ColocationSetup, FilterOptions, ResampleOptions, SpatialOptions, TimeOptions, VarPair};
pub use source::{
    GriddedSource, InMemoryGridded, InMemoryUngridded, ObsSource, ReadRequest, UngriddedSource, VertWhich,
    apply_read_request, select_station_vars,
};
pub use station::{StationData, StationProfile};
pub use units::{conversion_factor, convert_values};
