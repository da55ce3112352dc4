#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch CLI for the healthcare access analysis pipeline.
//!
//! Loads facility and census tract tables, computes access metrics,
//! classifies gaps, and writes recommendation and cost-benefit reports
//! to the output directory.
//!
//! Uses `indicatif-log-bridge` (via [`logging::init_logger`]) to route
//! `log` output through `indicatif::MultiProgress` so that log lines
//! and progress bars never fight for the terminal.

mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "care-access-map", about = "Healthcare access analysis pipeline")]
pub struct Cli {
    /// Cleaned facility table (CSV)
    #[arg(long, default_value = "data/processed/facilities.csv")]
    facilities: PathBuf,

    /// Census tract table with demographics (CSV)
    #[arg(long, default_value = "data/processed/census_tracts.csv")]
    tracts: PathBuf,

    /// Directory for generated reports
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Distance defining an access desert, in km
    #[arg(long, default_value_t = 5.0)]
    desert_threshold_km: f64,

    /// Radius for the facility density metric, in km
    #[arg(long, default_value_t = 5.0)]
    density_radius_km: f64,

    /// Degrees-to-kilometers conversion factor
    #[arg(long, default_value_t = care_access_spatial::DEG_TO_KM_DEFAULT)]
    deg_to_km: f64,

    /// Number of facility sites to recommend
    #[arg(long, default_value_t = 10)]
    sites: usize,
}

fn main() -> ExitCode {
    let multi = logging::init_logger();
    let args = Cli::parse();

    if pipeline::run(&args, &multi) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
