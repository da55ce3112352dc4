#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

mod facilities;
mod tracts;

use std::path::PathBuf;

use care_access_geography_models::{Geoid, InvalidGeoidError};
use thiserror::Error;

pub use facilities::{read_facilities, read_facilities_from};
pub use tracts::{read_combined, read_combined_from, read_tracts, read_tracts_from};

/// Errors raised while loading input tables.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Geoid(#[from] InvalidGeoidError),
    #[error("Duplicate GEOID in tract table: {0}")]
    DuplicateGeoid(Geoid),
}
