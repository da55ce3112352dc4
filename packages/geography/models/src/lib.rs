#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract demographic and geometry types.
//!
//! These types represent the geographic units (census tracts) whose
//! healthcare access is being measured. Optional source columns become
//! explicit `Option` fields resolved once at load time, not re-probed
//! at every computation site.

pub mod geoid;

pub use geoid::{Geoid, InvalidGeoidError};

use serde::{Deserialize, Serialize};

/// A census tract row with demographics and a geometry summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusTract {
    /// Validated tract GEOID, unique within a run.
    pub geoid: Geoid,
    /// Total population from ACS estimates.
    pub total_population: Option<u32>,
    /// Median household income in dollars.
    pub median_income: Option<f64>,
    /// Percentage of residents below the poverty line (0-100).
    pub poverty_rate: Option<f64>,
    /// Percentage of households without vehicle access (0-100).
    pub pct_no_vehicle: Option<f64>,
    /// Centroid latitude, if inside the study region.
    pub centroid_lat: Option<f64>,
    /// Centroid longitude, if inside the study region.
    pub centroid_lon: Option<f64>,
    /// Land area in square kilometers.
    pub area_sqkm: Option<f64>,
}

impl CensusTract {
    /// The tract centroid as a `(lat, lon)` pair, or `None` when either
    /// coordinate is missing. Spatial queries must skip such tracts
    /// rather than substitute a default location.
    #[must_use]
    pub const fn centroid(&self) -> Option<(f64, f64)> {
        match (self.centroid_lat, self.centroid_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Population density in people per square kilometer.
    ///
    /// `None` when population or area is missing, or area is zero.
    #[must_use]
    pub fn population_density(&self) -> Option<f64> {
        let population = self.total_population?;
        let area = self.area_sqkm?;
        if area > 0.0 {
            Some(f64::from(population) / area)
        } else {
            None
        }
    }
}

/// Axis-aligned bounding box for the study region, in degrees.
///
/// Centroids and facility coordinates outside the box are treated as
/// missing/invalid at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Approximate Los Angeles County bounds, the reference study region.
    pub const LA_COUNTY: Self = Self {
        lat_min: 33.7,
        lat_max: 34.8,
        lon_min: -118.7,
        lon_max: -117.6,
    };

    /// Whether a `(lat, lon)` point lies within the box (inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}
