#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Access metric result types and scoring configuration.

use care_access_geography_models::Geoid;
use serde::{Deserialize, Serialize};

/// Configuration for metric computation.
///
/// The defaults match the published LA County analysis; every value
/// is a policy lever and can be overridden per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    /// Kilometers per coordinate degree. Flat equatorial approximation;
    /// see the spatial crate docs for the error characteristics.
    pub deg_to_km: f64,
    /// Radius for the facility density component, in kilometers.
    pub density_radius_km: f64,
    /// Weight of the nearest-distance component (max contribution).
    pub distance_weight: f64,
    /// Weight of the nearby-facility density component.
    pub density_weight: f64,
    /// Weight of the population-density component.
    pub pop_density_weight: f64,
    /// Flat population-density contribution used when density data is
    /// incomplete (half credit: missing data, not a guess).
    pub flat_pop_density_score: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            deg_to_km: 111.0,
            density_radius_km: 5.0,
            distance_weight: 50.0,
            density_weight: 30.0,
            pop_density_weight: 20.0,
            flat_pop_density_score: 10.0,
        }
    }
}

/// Derived access metrics for one census tract.
///
/// Computed once per run from the facility and tract tables; a new run
/// recomputes fresh values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessMetric {
    /// Tract GEOID this row is keyed by.
    pub geoid: Geoid,
    /// Distance to the nearest facility in kilometers; `None` when the
    /// tract has no usable centroid.
    pub nearest_facility_km: Option<f64>,
    /// Mean distance to the three nearest facilities in kilometers,
    /// averaged over however many exist; `None` when the tract has no
    /// usable centroid.
    pub avg_3_nearest_km: Option<f64>,
    /// Number of facilities within the configured density radius.
    /// Zero for tracts with a missing centroid.
    pub facilities_within_radius: u32,
    /// Composite access score in `[0, 100]`, higher is better; `None`
    /// when the distance component is undefined for this tract.
    pub access_score: Option<f64>,
}

/// Overall facilities-per-capita rates for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerCapitaRates {
    /// Total facility count across the study region.
    pub total_facilities: u64,
    /// Total population across all tracts with known population.
    pub total_population: u64,
    /// Facilities per 10,000 residents.
    pub per_10k: f64,
    /// Facilities per 100,000 residents.
    pub per_100k: f64,
}

/// Min/max/mean/median statistics over a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary statistics for a full metrics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Per-capita facility rates; `None` when total population is zero
    /// or unknown.
    pub per_capita: Option<PerCapitaRates>,
    /// Nearest-distance statistics over tracts with a valid centroid.
    pub distances: Option<ValueStats>,
    /// Composite score statistics over tracts with a defined score.
    pub scores: Option<ValueStats>,
    /// Number of tracts beyond the coverage-gap threshold.
    pub gap_count: u64,
    /// Combined population of those tracts (known populations only).
    pub gap_population: u64,
}
