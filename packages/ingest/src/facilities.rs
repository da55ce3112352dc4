//! Facility table ingestion: categorization, coordinate validation,
//! and near-duplicate removal.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use care_access_facility_models::{Facility, FacilityCategory};
use care_access_geography_models::BoundingBox;
use serde::Deserialize;

use crate::IngestError;

/// Coordinate rounding used to collapse near-duplicate facility rows;
/// 4 decimal places is roughly an 11 m grid.
const DEDUP_DECIMALS: f64 = 1e4;

#[derive(Debug, Deserialize)]
struct RawFacility {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "type")]
    raw_type: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl RawFacility {
    /// Prefers an already-normalized `category` column; otherwise
    /// keyword-categorizes whatever type string the source provides.
    fn category(&self) -> FacilityCategory {
        let raw = self.category.as_deref().or(self.raw_type.as_deref());
        raw.map_or(FacilityCategory::Other, |value| {
            FacilityCategory::from_str(value.trim())
                .unwrap_or_else(|_| FacilityCategory::from_raw_type(value))
        })
    }
}

/// Reads the facility table from `path`, keeping only rows with
/// coordinates inside `bounds`.
///
/// # Errors
///
/// * `IngestError::MissingFile` when `path` does not exist
/// * `IngestError::Io` / `IngestError::Csv` on unreadable or malformed
///   input
pub fn read_facilities(path: &Path, bounds: &BoundingBox) -> Result<Vec<Facility>, IngestError> {
    if !path.exists() {
        return Err(IngestError::MissingFile(path.to_path_buf()));
    }
    log::info!("Loading facilities from {}", path.display());
    read_facilities_from(File::open(path)?, bounds)
}

/// Reader-based variant of [`read_facilities`].
///
/// Rows without coordinates or outside `bounds` are dropped with a
/// logged count. Rows sharing rounded coordinates are collapsed to the
/// first occurrence.
///
/// # Errors
///
/// * `IngestError::Csv` on malformed input
pub fn read_facilities_from(
    reader: impl Read,
    bounds: &BoundingBox,
) -> Result<Vec<Facility>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut missing_coords = 0_usize;
    let mut out_of_bounds = 0_usize;
    let mut seen = std::collections::BTreeSet::new();
    let mut facilities = Vec::new();

    for row in csv_reader.deserialize() {
        let raw: RawFacility = row?;

        let Some((lat, lon)) = raw.lat.zip(raw.lon) else {
            missing_coords += 1;
            continue;
        };
        if !bounds.contains(lat, lon) {
            out_of_bounds += 1;
            continue;
        }

        let key = (round_key(lat), round_key(lon));
        if !seen.insert(key) {
            continue;
        }

        facilities.push(Facility {
            name: raw.name.trim().to_string(),
            category: raw.category(),
            lat,
            lon,
        });
    }

    if missing_coords > 0 {
        log::warn!("Dropped {missing_coords} facilities without coordinates");
    }
    if out_of_bounds > 0 {
        log::warn!("Filtered {out_of_bounds} facilities outside the study area bounds");
    }
    log::info!("Loaded {} facilities", facilities.len());

    Ok(facilities)
}

#[allow(clippy::cast_possible_truncation)]
fn round_key(coord: f64) -> i64 {
    (coord * DEDUP_DECIMALS).round() as i64
}
