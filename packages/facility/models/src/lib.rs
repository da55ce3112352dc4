#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Healthcare facility types and the category taxonomy.
//!
//! This crate defines the canonical facility categories used across the
//! entire care-access-map system. All data sources normalize their
//! source-specific facility type strings into this shared taxonomy.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Standardized facility category.
///
/// Raw facility-type strings from source datasets are mapped into these
/// four buckets by [`FacilityCategory::from_raw_type`].
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacilityCategory {
    /// Full-service hospitals, medical centers, emergency and trauma care.
    Hospital,
    /// Urgent care and walk-in facilities.
    UrgentCare,
    /// Clinics, community health centers, primary care.
    Clinic,
    /// Anything that does not match the other categories.
    Other,
}

/// Keyword sets used to map raw facility-type strings to categories.
/// Checked in order: urgent care first so "urgent care hospital" does not
/// land in [`FacilityCategory::Hospital`].
const URGENT_CARE_KEYWORDS: &[&str] = &["urgent care", "urgent", "walk-in", "walk in"];
const HOSPITAL_KEYWORDS: &[&str] = &["hospital", "medical center", "emergency", "trauma"];
const CLINIC_KEYWORDS: &[&str] = &["clinic", "health center", "community health", "primary care"];

impl FacilityCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Hospital, Self::UrgentCare, Self::Clinic, Self::Other]
    }

    /// Categorizes a raw facility-type string by keyword matching.
    ///
    /// Matching is case-insensitive. Unrecognized or empty input maps to
    /// [`FacilityCategory::Other`].
    #[must_use]
    pub fn from_raw_type(raw: &str) -> Self {
        let lowered = raw.to_lowercase();

        if URGENT_CARE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Self::UrgentCare
        } else if HOSPITAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Self::Hospital
        } else if CLINIC_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Self::Clinic
        } else {
            Self::Other
        }
    }
}

/// A healthcare facility with a validated point location.
///
/// Immutable once loaded; the facility table owns all instances for the
/// duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Facility name as reported by the source dataset.
    pub name: String,
    /// Standardized category.
    pub category: FacilityCategory,
    /// Latitude in degrees (WGS84).
    pub lat: f64,
    /// Longitude in degrees (WGS84).
    pub lon: f64,
}

impl Facility {
    /// The facility's coordinates as a `(lat, lon)` pair.
    #[must_use]
    pub const fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}
