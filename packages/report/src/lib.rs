#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

mod csv_out;
mod text;

use std::fs::File;
use std::path::Path;

use thiserror::Error;

pub use csv_out::{write_metrics_csv, write_recommendations_csv, write_sites_csv};
pub use text::{write_cost_benefit_report, write_executive_summary};

/// Errors raised while writing report outputs.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Creates `path` for writing, creating parent directories as needed.
///
/// # Errors
///
/// * `ReportError::Io` when the directories or file cannot be created
pub fn create_output_file(path: &Path) -> Result<File, ReportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
