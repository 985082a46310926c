mod cli;
mod colocate_cmd;
mod config;
mod convert;
mod logging;
mod mda8_cmd;
mod output;
mod resample_cmd;
mod stats_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Colocate(args) => colocate_cmd::run(args),
        Command::Stats(args) => stats_cmd::run(args),
        Command::Resample(args) => resample_cmd::run(args),
        Command::Mda8(args) => mda8_cmd::run(args),
    }
}
