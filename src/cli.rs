use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Aerocol model/observation colocation and evaluation.
#[derive(Parser)]
#[command(
    name = "aerocol",
    version,
    about = "Colocate model and observation data and compute agreement statistics"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run a batch colocation from a TOML configuration.
    Colocate(ColocateArgs),
    /// Compute regional and per-station statistics of a colocated file.
    Stats(StatsArgs),
    /// Resample a colocated file to a coarser resolution.
    Resample(ResampleArgs),
    /// Compute the daily maximum 8-hour running mean of an hourly colocated file.
    Mda8(Mda8Args),
}

/// Arguments for the `colocate` subcommand.
#[derive(clap::Args)]
pub struct ColocateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "aerocol.toml")]
    pub config: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the `stats` subcommand.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Colocated NetCDF file.
    pub file: PathBuf,

    /// Regions evaluated besides WORLD (default: all predefined regions).
    #[arg(short, long, value_delimiter = ',')]
    pub regions: Vec<String>,

    /// Minimum number of valid pairs per statistic.
    #[arg(long, default_value_t = 1)]
    pub min_num_valid: usize,

    /// Weight grid cells by the cosine of their latitude.
    #[arg(long)]
    pub area_weights: bool,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `resample` subcommand.
#[derive(clap::Args)]
pub struct ResampleArgs {
    /// Colocated NetCDF file.
    pub file: PathBuf,

    /// Target temporal resolution, e.g. `monthly`.
    #[arg(long)]
    pub to: String,

    /// Mask both sides wherever either is missing before aggregating.
    #[arg(long)]
    pub colocate_time: bool,

    /// Minimum number of valid samples per output period.
    #[arg(long)]
    pub min_num_obs: Option<u32>,

    /// Take unset coverage and aggregation rules from the file metadata.
    #[arg(long)]
    pub settings_from_meta: bool,

    /// Output path (default: standard name next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `mda8` subcommand.
#[derive(clap::Args)]
pub struct Mda8Args {
    /// Hourly colocated NetCDF file.
    pub file: PathBuf,

    /// Output path (default: standard name next to the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
