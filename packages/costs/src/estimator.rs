//! Per-category cost estimation and cross-category aggregation.

use crate::model::{BREAK_EVEN_NEVER, CostCategory, CostEstimate, CostModel, CostSummary};

const FACILITY_HORIZON_YEARS: u32 = 10;
const PROGRAM_HORIZON_YEARS: u32 = 5;

/// Converts affected-population figures into financial estimates using
/// a fixed linear cost model.
#[derive(Debug, Clone, Default)]
pub struct CostBenefitEstimator {
    model: CostModel,
}

impl CostBenefitEstimator {
    /// Creates an estimator with an explicit cost model.
    #[must_use]
    pub const fn new(model: CostModel) -> Self {
        Self { model }
    }

    /// The active cost model.
    #[must_use]
    pub const fn model(&self) -> &CostModel {
        &self.model
    }

    /// Costs and savings of building one new facility serving
    /// `population_served` people.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_facility(&self, population_served: u64) -> CostEstimate {
        let m = &self.model;
        let population = population_served as f64;

        let construction = m.facility_construction_cost_per_sqft * m.typical_facility_size_sqft;
        let one_time = construction + m.facility_land_cost + m.facility_equipment_cost;
        let annual_operating = m.facility_annual_operating;

        let preventable_er = population / 1000.0 * m.facility_preventable_er_per_1000;
        let er_savings = preventable_er * (m.er_visit_cost - m.primary_care_visit_cost);
        let chronic_patients = population * m.chronic_condition_rate;
        let chronic_savings = chronic_patients
            * m.facility_chronic_management_rate
            * m.facility_chronic_savings_per_person;
        let annual_savings = er_savings + chronic_savings;

        self.finish(
            CostCategory::NewFacility,
            one_time,
            annual_operating,
            annual_savings,
            population,
            FACILITY_HORIZON_YEARS,
        )
    }

    /// Costs and savings of the mobile clinic fleet program.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_mobile_clinics(&self, population_served: u64) -> CostEstimate {
        let m = &self.model;
        let population = population_served as f64;
        let fleet = f64::from(m.mobile_clinics_needed);

        let one_time = m.mobile_clinic_vehicle_cost * fleet;
        let annual_operating = m.mobile_clinic_annual_operating * fleet;

        let preventable_er = population / 1000.0 * m.mobile_preventable_er_per_1000;
        let er_savings = preventable_er * (m.er_visit_cost - m.primary_care_visit_cost);
        let chronic_patients = population * m.chronic_condition_rate;
        let chronic_savings = chronic_patients
            * m.mobile_chronic_management_rate
            * m.mobile_chronic_savings_per_person;
        let annual_savings = er_savings + chronic_savings;

        self.finish(
            CostCategory::MobileClinics,
            one_time,
            annual_operating,
            annual_savings,
            population,
            PROGRAM_HORIZON_YEARS,
        )
    }

    /// Costs and savings of the transportation voucher program.
    /// Per-person cost is per expected active user, not per eligible
    /// resident.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_transportation(&self, population_served: u64) -> CostEstimate {
        let m = &self.model;
        let active_users = population_served as f64 * m.transport_active_user_rate;

        let one_time = m.transport_program_setup_cost;
        let annual_trips = active_users * m.transport_trips_per_person_per_year;
        let annual_operating =
            annual_trips * m.transport_voucher_cost_per_trip * m.transport_subsidy_percentage;

        let preventable_er = active_users / 1000.0 * m.transport_preventable_er_per_1000;
        let er_savings = preventable_er * (m.er_visit_cost - m.primary_care_visit_cost);
        let kept_appointments = active_users
            * m.transport_trips_per_person_per_year
            * m.transport_kept_appointment_value;
        let annual_savings = er_savings + kept_appointments;

        self.finish(
            CostCategory::Transportation,
            one_time,
            annual_operating,
            annual_savings,
            active_users,
            PROGRAM_HORIZON_YEARS,
        )
    }

    /// Costs and savings of the telehealth kiosk program. Per-person
    /// cost is per expected telehealth user.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_telehealth(&self, population_served: u64) -> CostEstimate {
        let m = &self.model;
        let users = population_served as f64 * m.telehealth_user_rate;

        let one_time = m.telehealth_setup_per_kiosk * f64::from(m.telehealth_kiosks_needed);
        let annual_operating = m.telehealth_annual_operating;

        let visits = users * m.telehealth_visits_per_user_per_year;
        let patient_savings = visits * m.telehealth_patient_savings_per_visit;
        let provider_savings = visits * m.telehealth_provider_savings_per_visit;
        let annual_savings = patient_savings + provider_savings;

        self.finish(
            CostCategory::Telehealth,
            one_time,
            annual_operating,
            annual_savings,
            users,
            PROGRAM_HORIZON_YEARS,
        )
    }

    /// Aggregates category estimates into one financial summary.
    ///
    /// Facility costs scale with the number of recommended sites; every
    /// other category is a single program counted once.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self, estimates: &[CostEstimate], facility_site_count: usize) -> CostSummary {
        let mut total_one_time = 0.0;
        let mut total_annual = 0.0;
        let mut total_savings = 0.0;

        for estimate in estimates {
            let multiplier = if estimate.category == CostCategory::NewFacility {
                facility_site_count as f64
            } else {
                1.0
            };
            total_one_time += estimate.one_time_costs * multiplier;
            total_annual += estimate.annual_operating_costs * multiplier;
            total_savings += estimate.annual_savings_estimate * multiplier;
        }

        let ten_year_investment = total_one_time + total_annual * 10.0;
        let ten_year_savings = total_savings * 10.0;
        let ten_year_net = ten_year_savings - ten_year_investment;
        let roi_pct = if ten_year_investment > 0.0 {
            ten_year_net / ten_year_investment * 100.0
        } else {
            0.0
        };

        let mut ranking = estimates.to_vec();
        ranking.sort_by(|a, b| b.benefit_cost_ratio.total_cmp(&a.benefit_cost_ratio));

        CostSummary {
            total_one_time_costs: total_one_time,
            total_annual_operating_costs: total_annual,
            total_annual_savings: total_savings,
            ten_year_investment,
            ten_year_savings,
            ten_year_net_benefit: ten_year_net,
            ten_year_roi_pct: roi_pct,
            cost_effectiveness_ranking: ranking,
        }
    }

    fn finish(
        &self,
        category: CostCategory,
        one_time: f64,
        annual_operating: f64,
        annual_savings: f64,
        persons_served: f64,
        horizon_years: u32,
    ) -> CostEstimate {
        let horizon = f64::from(horizon_years);
        let net_annual_benefit = annual_savings - annual_operating;

        let (break_even, ratio) = if net_annual_benefit > 0.0 {
            (
                one_time / net_annual_benefit,
                annual_savings * horizon / (one_time + annual_operating * horizon),
            )
        } else if annual_operating > 0.0 {
            (BREAK_EVEN_NEVER, annual_savings / annual_operating)
        } else {
            (BREAK_EVEN_NEVER, 0.0)
        };

        let cost_per_person = if persons_served > 0.0 {
            (one_time + annual_operating * horizon) / persons_served
        } else {
            0.0
        };

        log::debug!(
            "{category}: one-time ${one_time:.0}, operating ${annual_operating:.0}/yr, \
             savings ${annual_savings:.0}/yr, break-even {break_even:.1}yr"
        );

        CostEstimate {
            category,
            one_time_costs: one_time,
            annual_operating_costs: annual_operating,
            cost_per_person_served: cost_per_person,
            roi_timeframe_years: horizon_years,
            annual_savings_estimate: annual_savings,
            break_even_years: break_even,
            benefit_cost_ratio: ratio,
        }
    }
}
