//! Cost model constants and estimate records.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Break-even sentinel: the intervention does not break even within
/// any modeled horizon.
pub const BREAK_EVEN_NEVER: f64 = 999.0;

/// Intervention category a cost estimate applies to.
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
pub enum CostCategory {
    #[serde(rename = "New Healthcare Facility")]
    #[strum(serialize = "New Healthcare Facility")]
    NewFacility,
    #[serde(rename = "Mobile Health Clinics")]
    #[strum(serialize = "Mobile Health Clinics")]
    MobileClinics,
    #[serde(rename = "Transportation Assistance")]
    #[strum(serialize = "Transportation Assistance")]
    Transportation,
    #[serde(rename = "Telehealth Expansion")]
    #[strum(serialize = "Telehealth Expansion")]
    Telehealth,
}

/// Per-category unit costs and savings assumptions, in 2026 dollars
/// for the LA County market.
///
/// An explicit struct rather than module constants so tests and
/// callers can parameterize the model without global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostModel {
    pub facility_construction_cost_per_sqft: f64,
    pub typical_facility_size_sqft: f64,
    pub facility_land_cost: f64,
    pub facility_equipment_cost: f64,
    pub facility_annual_operating: f64,

    pub mobile_clinic_vehicle_cost: f64,
    pub mobile_clinic_annual_operating: f64,
    pub mobile_clinics_needed: u32,

    pub transport_voucher_cost_per_trip: f64,
    pub transport_trips_per_person_per_year: f64,
    pub transport_subsidy_percentage: f64,
    /// Value of a kept appointment, per subsidized trip.
    pub transport_kept_appointment_value: f64,
    /// Share of the eligible population expected to use the service.
    pub transport_active_user_rate: f64,
    pub transport_program_setup_cost: f64,

    pub telehealth_setup_per_kiosk: f64,
    pub telehealth_kiosks_needed: u32,
    pub telehealth_annual_operating: f64,
    /// Share of the served population expected to use telehealth.
    pub telehealth_user_rate: f64,
    pub telehealth_visits_per_user_per_year: f64,
    pub telehealth_patient_savings_per_visit: f64,
    pub telehealth_provider_savings_per_visit: f64,

    pub er_visit_cost: f64,
    pub primary_care_visit_cost: f64,
    /// Annual preventable ER visits per 1000 residents gaining access
    /// to a fixed facility.
    pub facility_preventable_er_per_1000: f64,
    /// Same rate for mobile clinic coverage (lower reach).
    pub mobile_preventable_er_per_1000: f64,
    /// Same rate per 1000 active transportation users.
    pub transport_preventable_er_per_1000: f64,

    /// Share of the population with chronic conditions.
    pub chronic_condition_rate: f64,
    pub facility_chronic_management_rate: f64,
    pub facility_chronic_savings_per_person: f64,
    pub mobile_chronic_management_rate: f64,
    pub mobile_chronic_savings_per_person: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            facility_construction_cost_per_sqft: 450.0,
            typical_facility_size_sqft: 15_000.0,
            facility_land_cost: 2_000_000.0,
            facility_equipment_cost: 1_500_000.0,
            facility_annual_operating: 3_000_000.0,

            mobile_clinic_vehicle_cost: 250_000.0,
            mobile_clinic_annual_operating: 400_000.0,
            mobile_clinics_needed: 5,

            transport_voucher_cost_per_trip: 25.0,
            transport_trips_per_person_per_year: 4.0,
            transport_subsidy_percentage: 0.75,
            transport_kept_appointment_value: 100.0,
            transport_active_user_rate: 0.10,
            transport_program_setup_cost: 50_000.0,

            telehealth_setup_per_kiosk: 15_000.0,
            telehealth_kiosks_needed: 20,
            telehealth_annual_operating: 250_000.0,
            telehealth_user_rate: 0.20,
            telehealth_visits_per_user_per_year: 2.0,
            telehealth_patient_savings_per_visit: 75.0,
            telehealth_provider_savings_per_visit: 25.0,

            er_visit_cost: 2_000.0,
            primary_care_visit_cost: 150.0,
            facility_preventable_er_per_1000: 250.0,
            mobile_preventable_er_per_1000: 150.0,
            transport_preventable_er_per_1000: 200.0,

            chronic_condition_rate: 0.40,
            facility_chronic_management_rate: 0.20,
            facility_chronic_savings_per_person: 1_500.0,
            mobile_chronic_management_rate: 0.10,
            mobile_chronic_savings_per_person: 1_000.0,
        }
    }
}

/// Financial analysis of one intervention category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub category: CostCategory,
    pub one_time_costs: f64,
    pub annual_operating_costs: f64,
    pub cost_per_person_served: f64,
    /// Horizon used for the benefit-cost ratio: 10 years for fixed
    /// facilities (long-lived capital), 5 for programs.
    pub roi_timeframe_years: u32,
    pub annual_savings_estimate: f64,
    /// Years to recoup one-time costs, or [`BREAK_EVEN_NEVER`].
    pub break_even_years: f64,
    pub benefit_cost_ratio: f64,
}

impl CostEstimate {
    /// Whether the intervention ever recoups its one-time costs.
    #[must_use]
    pub fn breaks_even(&self) -> bool {
        self.break_even_years < BREAK_EVEN_NEVER
    }
}

/// Aggregate financial picture across all estimated categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_one_time_costs: f64,
    pub total_annual_operating_costs: f64,
    pub total_annual_savings: f64,
    pub ten_year_investment: f64,
    pub ten_year_savings: f64,
    pub ten_year_net_benefit: f64,
    /// Percent return over the ten-year horizon.
    pub ten_year_roi_pct: f64,
    /// Categories ranked by benefit-cost ratio, best first.
    pub cost_effectiveness_ranking: Vec<CostEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        assert_eq!(
            CostCategory::NewFacility.to_string(),
            "New Healthcare Facility"
        );
        assert_eq!(
            CostCategory::Transportation.to_string(),
            "Transportation Assistance"
        );
    }

    #[test]
    fn sentinel_never_breaks_even() {
        let estimate = CostEstimate {
            category: CostCategory::Telehealth,
            one_time_costs: 1.0,
            annual_operating_costs: 1.0,
            cost_per_person_served: 1.0,
            roi_timeframe_years: 5,
            annual_savings_estimate: 0.0,
            break_even_years: BREAK_EVEN_NEVER,
            benefit_cost_ratio: 0.0,
        };
        assert!(!estimate.breaks_even());
    }
}
