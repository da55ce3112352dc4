#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types for classified access gaps and policy recommendations.

use care_access_geography_models::Geoid;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Urgency tier of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// All tiers, most urgent first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Critical, Self::High, Self::Medium, Self::Low]
    }
}

/// Intervention category of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RecommendationCategory {
    Infrastructure,
    #[serde(rename = "Service Expansion")]
    #[strum(serialize = "Service Expansion")]
    ServiceExpansion,
    Transportation,
    Equity,
}

/// Coarse cost bucket attached to a recommendation. Detailed dollar
/// figures come from the cost-benefit estimator, not from here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CostTier {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
}

/// Implementation horizon of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Timeframe {
    Immediate,
    #[serde(rename = "Short-term")]
    #[strum(serialize = "Short-term")]
    ShortTerm,
    #[serde(rename = "Medium-term")]
    #[strum(serialize = "Medium-term")]
    MediumTerm,
    #[serde(rename = "Long-term")]
    #[strum(serialize = "Long-term")]
    LongTerm,
}

impl Timeframe {
    /// All horizons, soonest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Immediate,
            Self::ShortTerm,
            Self::MediumTerm,
            Self::LongTerm,
        ]
    }
}

/// A tract beyond the desert distance threshold, ranked by severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesertTract {
    pub geoid: Geoid,
    pub nearest_facility_km: f64,
    pub total_population: u32,
    /// `nearest_facility_km * total_population`; larger is more urgent.
    pub severity_score: f64,
}

/// A tract flagged as a vulnerable population with poor access,
/// ranked by priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerableTract {
    pub geoid: Geoid,
    pub access_score: f64,
    pub total_population: u32,
    pub poverty_rate: Option<f64>,
    /// `(100 - access_score) * (population/1000) * (1 + poverty_rate/100)`.
    pub priority_score: f64,
}

/// A suggested location for a new facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecommendation {
    pub geoid: Geoid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population_served: u32,
    pub current_distance_km: Option<f64>,
    pub median_income: Option<f64>,
    pub priority_reason: String,
    /// Estimated people reached within an assumed 5 km catchment.
    pub estimated_impact: u64,
}

/// A structured policy recommendation for decision makers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub affected_population: u64,
    pub affected_tracts: Vec<Geoid>,
    pub estimated_cost: CostTier,
    pub implementation_timeframe: Timeframe,
    pub expected_impact: String,
    pub actionable_steps: Vec<String>,
    pub metrics_to_track: Vec<String>,
}

/// Tunable thresholds for gap classification and recommendation
/// triggers. These are the primary policy levers of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Distance beyond which a tract is an access desert, in km.
    pub desert_threshold_km: f64,
    /// Distance defining an extreme access desert, in km.
    pub extreme_desert_km: f64,
    /// Poverty rate (percent) above which a tract is a vulnerability
    /// candidate.
    pub high_poverty_pct: f64,
    /// Share of households without a vehicle (percent) above which a
    /// tract is a vulnerability candidate.
    pub no_vehicle_pct: f64,
    /// Access score below which a tract counts as having poor access.
    pub low_access_score: f64,
    /// Access score below which telehealth expansion is triggered.
    pub telehealth_score: f64,
    /// Income quantile defining "low-income" for the equity
    /// recommendation.
    pub equity_income_quantile: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            desert_threshold_km: 5.0,
            extreme_desert_km: 10.0,
            high_poverty_pct: 15.0,
            no_vehicle_pct: 10.0,
            low_access_score: 50.0,
            telehealth_score: 40.0,
            equity_income_quantile: 0.25,
        }
    }
}
