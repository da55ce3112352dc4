//! Facility-siting suggestions and the fixed policy recommendation
//! taxonomy.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use care_access_geography_models::{CensusTract, Geoid};
use care_access_metrics::stats;
use care_access_metrics_models::AccessMetric;
use care_access_policy_models::{
    CostTier, DesertTract, PolicyConfig, PolicyRecommendation, Priority, RecommendationCategory,
    SiteRecommendation, Timeframe, VulnerableTract,
};

use crate::GapClassifier;

/// Assumed service radius of a new facility, in km.
const CATCHMENT_RADIUS_KM: f64 = 5.0;

/// Turns classified gaps into ranked siting suggestions and structured
/// policy recommendations.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: PolicyConfig,
}

impl RecommendationEngine {
    /// Creates an engine with explicit thresholds.
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Ranks up to `n` tract locations for new facilities.
    ///
    /// Deserts and vulnerable tracts are merged and deduplicated by
    /// GEOID with desert entries taking precedence, then sorted by
    /// severity and priority descending (absent scores sort last).
    #[must_use]
    pub fn recommend_facility_sites(
        &self,
        tracts: &[CensusTract],
        metrics: &BTreeMap<Geoid, AccessMetric>,
        deserts: &[DesertTract],
        vulnerable: &[VulnerableTract],
        n: usize,
    ) -> Vec<SiteRecommendation> {
        log::info!("Analyzing optimal locations for {n} new facilities...");

        let mut seen = BTreeSet::new();
        let mut candidates: Vec<(&Geoid, Option<f64>, Option<f64>)> = Vec::new();
        for desert in deserts {
            if seen.insert(&desert.geoid) {
                candidates.push((&desert.geoid, Some(desert.severity_score), None));
            }
        }
        for vuln in vulnerable {
            if seen.insert(&vuln.geoid) {
                candidates.push((&vuln.geoid, None, Some(vuln.priority_score)));
            }
        }

        candidates.sort_by(|a, b| {
            desc_nulls_last(a.1, b.1).then_with(|| desc_nulls_last(a.2, b.2))
        });

        let by_geoid: BTreeMap<&Geoid, &CensusTract> =
            tracts.iter().map(|t| (&t.geoid, t)).collect();
        let median_income = set_median_income(tracts);

        let sites: Vec<SiteRecommendation> = candidates
            .into_iter()
            .take(n)
            .filter_map(|(geoid, _, _)| {
                let tract = by_geoid.get(geoid)?;
                let nearest_km = metrics.get(geoid).and_then(|m| m.nearest_facility_km);
                Some(SiteRecommendation {
                    geoid: (*geoid).clone(),
                    latitude: tract.centroid_lat,
                    longitude: tract.centroid_lon,
                    population_served: tract.total_population.unwrap_or(0),
                    current_distance_km: nearest_km,
                    median_income: tract.median_income,
                    priority_reason: self.priority_reason(tract, nearest_km, median_income),
                    estimated_impact: estimate_impact(tract),
                })
            })
            .collect();

        log::info!(
            "Generated {} facility placement recommendations",
            sites.len()
        );

        sites
    }

    /// Produces the up-to-five fixed-category policy recommendations.
    /// A category is emitted only when its trigger set is non-empty.
    #[must_use]
    pub fn generate_recommendations(
        &self,
        tracts: &[CensusTract],
        metrics: &BTreeMap<Geoid, AccessMetric>,
    ) -> Vec<PolicyRecommendation> {
        log::info!("Generating comprehensive policy recommendations...");

        let cfg = &self.config;
        let classifier = GapClassifier::new(cfg.clone());
        let mut recommendations = Vec::new();

        let extreme_deserts = classifier.access_deserts(tracts, metrics, cfg.extreme_desert_km);
        if !extreme_deserts.is_empty() {
            let population: u64 = extreme_deserts
                .iter()
                .map(|d| u64::from(d.total_population))
                .sum();
            recommendations.push(PolicyRecommendation {
                priority: Priority::Critical,
                category: RecommendationCategory::Infrastructure,
                title: "Build Healthcare Facilities in Extreme Access Deserts".to_string(),
                description: format!(
                    "Identified {} areas where residents are more than {:.0}km from the \
                     nearest healthcare facility, affecting {} people.",
                    extreme_deserts.len(),
                    cfg.extreme_desert_km,
                    group_thousands(population)
                ),
                affected_population: population,
                affected_tracts: extreme_deserts
                    .iter()
                    .take(10)
                    .map(|d| d.geoid.clone())
                    .collect(),
                estimated_cost: CostTier::VeryHigh,
                implementation_timeframe: Timeframe::MediumTerm,
                expected_impact:
                    "Reduce average travel distance by 40-60% for affected populations".to_string(),
                actionable_steps: to_strings(&[
                    "Conduct detailed land use and zoning analysis",
                    "Engage with community stakeholders",
                    "Secure funding through state/federal grants",
                    "Partner with healthcare systems for facility operation",
                    "Prioritize urgent care and primary care services",
                ]),
                metrics_to_track: to_strings(&[
                    "Average distance to nearest facility",
                    "Emergency room visits from affected areas",
                    "Preventive care utilization rates",
                ]),
            });
        }

        let vulnerable = classifier.vulnerable_populations(tracts, metrics);
        if !vulnerable.is_empty() {
            let population: u64 = vulnerable
                .iter()
                .map(|v| u64::from(v.total_population))
                .sum();
            recommendations.push(PolicyRecommendation {
                priority: Priority::High,
                category: RecommendationCategory::ServiceExpansion,
                title: "Deploy Mobile Health Clinics to Underserved Communities".to_string(),
                description: format!(
                    "Implement mobile clinic program targeting {} vulnerable areas with \
                     limited transportation and poor access.",
                    vulnerable.len()
                ),
                affected_population: population,
                affected_tracts: vulnerable
                    .iter()
                    .take(15)
                    .map(|v| v.geoid.clone())
                    .collect(),
                estimated_cost: CostTier::Medium,
                implementation_timeframe: Timeframe::ShortTerm,
                expected_impact: "Immediate access improvement for vulnerable populations \
                                  without requiring new infrastructure"
                    .to_string(),
                actionable_steps: to_strings(&[
                    "Establish rotating schedule for mobile clinics",
                    "Partner with local community centers and schools",
                    "Provide basic primary care, vaccinations, and screenings",
                    "Coordinate with existing healthcare providers",
                    "Offer translation services for diverse communities",
                ]),
                metrics_to_track: to_strings(&[
                    "Number of patients served",
                    "Services provided per visit",
                    "Patient satisfaction scores",
                    "Reduction in emergency visits",
                ]),
            });
        }

        let no_vehicle_areas: Vec<&CensusTract> = tracts
            .iter()
            .filter(|t| t.pct_no_vehicle.is_some_and(|pct| pct > cfg.no_vehicle_pct))
            .collect();
        if !no_vehicle_areas.is_empty() {
            let population = sum_population(&no_vehicle_areas);
            recommendations.push(PolicyRecommendation {
                priority: Priority::High,
                category: RecommendationCategory::Transportation,
                title: "Expand Healthcare Transportation Services".to_string(),
                description: format!(
                    "Over {:.0}% of households in {} census tracts lack vehicle access, \
                     creating significant barriers to healthcare.",
                    cfg.no_vehicle_pct,
                    no_vehicle_areas.len()
                ),
                affected_population: population,
                affected_tracts: no_vehicle_areas
                    .iter()
                    .take(10)
                    .map(|t| t.geoid.clone())
                    .collect(),
                estimated_cost: CostTier::Low,
                implementation_timeframe: Timeframe::Immediate,
                expected_impact: "Reduce transportation barriers for 50,000+ residents"
                    .to_string(),
                actionable_steps: to_strings(&[
                    "Expand medical transport voucher programs",
                    "Partner with ride-sharing services for subsidized healthcare trips",
                    "Add bus routes connecting to major medical centers",
                    "Implement volunteer driver programs",
                    "Provide real-time transportation coordination",
                ]),
                metrics_to_track: to_strings(&[
                    "Number of subsidized trips provided",
                    "Missed appointment rates",
                    "Patient satisfaction with transportation",
                    "Cost per trip",
                ]),
            });
        }

        let low_access: Vec<&CensusTract> = tracts
            .iter()
            .filter(|t| {
                metrics
                    .get(&t.geoid)
                    .and_then(|m| m.access_score)
                    .is_some_and(|score| score < cfg.telehealth_score)
            })
            .collect();
        if !low_access.is_empty() {
            let population = sum_population(&low_access);
            recommendations.push(PolicyRecommendation {
                priority: Priority::Medium,
                category: RecommendationCategory::ServiceExpansion,
                title: "Expand Telehealth Services in Low-Access Areas".to_string(),
                description: format!(
                    "Leverage telehealth to improve access for {} areas with poor \
                     physical access scores.",
                    low_access.len()
                ),
                affected_population: population,
                affected_tracts: low_access
                    .iter()
                    .take(20)
                    .map(|t| t.geoid.clone())
                    .collect(),
                estimated_cost: CostTier::Low,
                implementation_timeframe: Timeframe::ShortTerm,
                expected_impact: "Provide immediate access to primary care and specialists"
                    .to_string(),
                actionable_steps: to_strings(&[
                    "Provide subsidized internet/devices for low-income families",
                    "Set up telehealth kiosks at libraries and community centers",
                    "Train healthcare providers on telehealth best practices",
                    "Ensure language support and accessibility",
                    "Coordinate with existing providers for hybrid care models",
                ]),
                metrics_to_track: to_strings(&[
                    "Telehealth appointment volume",
                    "Patient outcomes comparison",
                    "Patient satisfaction",
                    "Cost savings vs. in-person care",
                ]),
            });
        }

        let incomes: Vec<f64> = tracts.iter().filter_map(|t| t.median_income).collect();
        let income_cutoff = stats::quantile(&incomes, cfg.equity_income_quantile);
        let equity_tracts: Vec<&CensusTract> = tracts
            .iter()
            .filter(|t| {
                let low_income = match (t.median_income, income_cutoff) {
                    (Some(income), Some(cutoff)) => income < cutoff,
                    _ => false,
                };
                low_income
                    && metrics
                        .get(&t.geoid)
                        .and_then(|m| m.access_score)
                        .is_some_and(|score| score < cfg.low_access_score)
            })
            .collect();
        if !equity_tracts.is_empty() {
            let population = sum_population(&equity_tracts);
            recommendations.push(PolicyRecommendation {
                priority: Priority::Critical,
                category: RecommendationCategory::Equity,
                title: "Prioritize Healthcare Investments in Low-Income Areas".to_string(),
                description: format!(
                    "Identified {} low-income census tracts with poor healthcare access \
                     requiring priority intervention.",
                    equity_tracts.len()
                ),
                affected_population: population,
                affected_tracts: equity_tracts
                    .iter()
                    .take(15)
                    .map(|t| t.geoid.clone())
                    .collect(),
                estimated_cost: CostTier::High,
                implementation_timeframe: Timeframe::MediumTerm,
                expected_impact: "Reduce healthcare disparities and improve health equity"
                    .to_string(),
                actionable_steps: to_strings(&[
                    "Allocate additional funding to safety-net providers",
                    "Expand Medicaid/Medicare coverage and enrollment",
                    "Provide free or subsidized preventive care",
                    "Establish community health worker programs",
                    "Partner with FQHCs for expanded services",
                ]),
                metrics_to_track: to_strings(&[
                    "Health outcome disparities",
                    "Insurance coverage rates",
                    "Preventable hospitalization rates",
                    "Life expectancy gaps",
                ]),
            });
        }

        log::info!("Generated {} policy recommendations", recommendations.len());

        recommendations
    }

    fn priority_reason(
        &self,
        tract: &CensusTract,
        nearest_km: Option<f64>,
        median_income: Option<f64>,
    ) -> String {
        let cfg = &self.config;
        let mut reasons = Vec::new();

        if let Some(km) = nearest_km {
            if km > cfg.extreme_desert_km {
                reasons.push("Extreme distance to care");
            } else if km > cfg.desert_threshold_km {
                reasons.push("Limited access");
            }
        }

        if let (Some(income), Some(median)) = (tract.median_income, median_income)
            && income < median
        {
            reasons.push("Low-income community");
        }

        if tract
            .poverty_rate
            .is_some_and(|rate| rate > cfg.high_poverty_pct)
        {
            reasons.push("High poverty rate");
        }

        if tract
            .pct_no_vehicle
            .is_some_and(|pct| pct > cfg.no_vehicle_pct)
        {
            reasons.push("Transportation barriers");
        }

        if reasons.is_empty() {
            "Access improvement opportunity".to_string()
        } else {
            reasons.join("; ")
        }
    }
}

/// People reached within the assumed catchment circle; falls back to a
/// rough population multiplier when density is unknown.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn estimate_impact(tract: &CensusTract) -> u64 {
    tract.population_density().map_or_else(
        || u64::from(tract.total_population.unwrap_or(0)) * 2,
        |density| {
            let area = std::f64::consts::PI * CATCHMENT_RADIUS_KM * CATCHMENT_RADIUS_KM;
            (density * area).max(0.0) as u64
        },
    )
}

/// The tract set's own median income, the "low income" reference point.
fn set_median_income(tracts: &[CensusTract]) -> Option<f64> {
    let incomes: Vec<f64> = tracts.iter().filter_map(|t| t.median_income).collect();
    stats::median(&incomes)
}

fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sum_population(tracts: &[&CensusTract]) -> u64 {
    tracts
        .iter()
        .filter_map(|t| t.total_population)
        .map(u64::from)
        .sum()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Formats an integer with comma thousands separators.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tract(
        geoid: &str,
        population: Option<u32>,
        income: Option<f64>,
        poverty: Option<f64>,
        no_vehicle: Option<f64>,
    ) -> CensusTract {
        CensusTract {
            geoid: Geoid::parse(geoid).unwrap(),
            total_population: population,
            median_income: income,
            poverty_rate: poverty,
            pct_no_vehicle: no_vehicle,
            centroid_lat: Some(34.0),
            centroid_lon: Some(-118.0),
            area_sqkm: None,
        }
    }

    fn metric(geoid: &str, nearest_km: Option<f64>, score: Option<f64>) -> (Geoid, AccessMetric) {
        let geoid = Geoid::parse(geoid).unwrap();
        (
            geoid.clone(),
            AccessMetric {
                geoid,
                nearest_facility_km: nearest_km,
                avg_3_nearest_km: None,
                facilities_within_radius: 0,
                access_score: score,
            },
        )
    }

    fn desert(geoid: &str, km: f64, population: u32) -> DesertTract {
        DesertTract {
            geoid: Geoid::parse(geoid).unwrap(),
            nearest_facility_km: km,
            total_population: population,
            severity_score: km * f64::from(population),
        }
    }

    fn vulnerable(geoid: &str, score: f64, population: u32) -> VulnerableTract {
        VulnerableTract {
            geoid: Geoid::parse(geoid).unwrap(),
            access_score: score,
            total_population: population,
            poverty_rate: None,
            priority_score: (100.0 - score) * (f64::from(population) / 1000.0),
        }
    }

    #[test]
    fn sites_deduplicate_with_desert_precedence() {
        let tracts = vec![
            tract("06037100100", Some(1000), Some(30_000.0), None, None),
            tract("06037100200", Some(2000), Some(80_000.0), None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(12.0), Some(30.0)),
            metric("06037100200", Some(8.0), Some(60.0)),
        ]
        .into_iter()
        .collect();

        let deserts = vec![desert("06037100100", 12.0, 1000), desert("06037100200", 8.0, 2000)];
        let vuln = vec![vulnerable("06037100100", 30.0, 1000)];

        let engine = RecommendationEngine::default();
        let sites = engine.recommend_facility_sites(&tracts, &metrics, &deserts, &vuln, 10);

        assert_eq!(sites.len(), 2);
        // Desert severity ranks 8*2000 = 16000 over 12*1000 = 12000; the
        // duplicate vulnerable entry for tract 1 was dropped.
        assert_eq!(sites[0].geoid.to_string(), "06037100200");
        assert_eq!(sites[1].geoid.to_string(), "06037100100");
    }

    #[test]
    fn sites_cap_at_requested_count_and_rank_deserts_first() {
        let tracts: Vec<CensusTract> = (1..=4)
            .map(|i| {
                tract(
                    &format!("0603710{i:04}"),
                    Some(1000),
                    Some(30_000.0),
                    None,
                    None,
                )
            })
            .collect();
        let metrics: BTreeMap<Geoid, AccessMetric> = tracts
            .iter()
            .map(|t| metric(&t.geoid.to_string(), Some(6.0), Some(30.0)))
            .collect();

        let deserts = vec![desert("06037100001", 6.0, 1000)];
        let vuln = vec![
            vulnerable("06037100002", 10.0, 9000),
            vulnerable("06037100003", 20.0, 9000),
            vulnerable("06037100004", 30.0, 9000),
        ];

        let engine = RecommendationEngine::default();
        let sites = engine.recommend_facility_sites(&tracts, &metrics, &deserts, &vuln, 2);

        assert_eq!(sites.len(), 2);
        // Desert entries outrank vulnerable-only entries even with tiny
        // severity, because absent severity sorts last.
        assert_eq!(sites[0].geoid.to_string(), "06037100001");
        assert_eq!(sites[1].geoid.to_string(), "06037100002");
    }

    #[test]
    fn priority_reason_concatenates_applicable_conditions() {
        let tracts = vec![
            tract("06037100100", Some(1000), Some(20_000.0), Some(20.0), Some(15.0)),
            tract("06037100200", Some(1000), Some(90_000.0), None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(12.0), Some(20.0)),
            metric("06037100200", Some(2.0), Some(45.0)),
        ]
        .into_iter()
        .collect();

        let deserts = vec![desert("06037100100", 12.0, 1000)];
        let vuln = vec![vulnerable("06037100200", 45.0, 1000)];

        let engine = RecommendationEngine::default();
        let sites = engine.recommend_facility_sites(&tracts, &metrics, &deserts, &vuln, 10);

        assert_eq!(
            sites[0].priority_reason,
            "Extreme distance to care; Low-income community; High poverty rate; \
             Transportation barriers"
        );
        assert_eq!(sites[1].priority_reason, "Access improvement opportunity");
    }

    #[test]
    fn impact_uses_density_when_known() {
        let mut dense = tract("06037100100", Some(1000), None, None, None);
        dense.area_sqkm = Some(2.0);
        let sparse = tract("06037100200", Some(1000), None, None, None);

        // 500 people/sqkm over a pi * 25 sqkm catchment.
        let expected = (500.0 * std::f64::consts::PI * 25.0) as u64;
        assert_eq!(estimate_impact(&dense), expected);
        assert_eq!(estimate_impact(&sparse), 2000);
    }

    #[test]
    fn all_five_recommendations_trigger_on_a_rich_scenario() {
        // One extreme desert, one poor low-income tract, one vehicle-free
        // tract, and one wealthy well-served tract to anchor the income
        // median and quantile.
        let tracts = vec![
            tract("06037100100", Some(4000), Some(20_000.0), Some(25.0), Some(20.0)),
            tract("06037100200", Some(2000), Some(40_000.0), Some(5.0), Some(2.0)),
            tract("06037100300", Some(1000), Some(90_000.0), Some(2.0), Some(1.0)),
            tract("06037100400", Some(3000), Some(95_000.0), Some(1.0), Some(1.0)),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(15.0), Some(20.0)),
            metric("06037100200", Some(6.0), Some(35.0)),
            metric("06037100300", Some(1.0), Some(80.0)),
            metric("06037100400", Some(0.5), Some(95.0)),
        ]
        .into_iter()
        .collect();

        let engine = RecommendationEngine::default();
        let recommendations = engine.generate_recommendations(&tracts, &metrics);

        let categories: Vec<(Priority, RecommendationCategory)> = recommendations
            .iter()
            .map(|r| (r.priority, r.category))
            .collect();
        assert_eq!(
            categories,
            vec![
                (Priority::Critical, RecommendationCategory::Infrastructure),
                (Priority::High, RecommendationCategory::ServiceExpansion),
                (Priority::High, RecommendationCategory::Transportation),
                (Priority::Medium, RecommendationCategory::ServiceExpansion),
                (Priority::Critical, RecommendationCategory::Equity),
            ]
        );
        for rec in &recommendations {
            assert!(!rec.actionable_steps.is_empty());
            assert!(!rec.metrics_to_track.is_empty());
            assert!(!rec.affected_tracts.is_empty());
        }
    }

    #[test]
    fn no_recommendations_without_triggers() {
        // Well-served wealthy area: nothing fires.
        let tracts = vec![
            tract("06037100100", Some(1000), Some(90_000.0), Some(2.0), Some(1.0)),
            tract("06037100200", Some(1000), Some(95_000.0), Some(2.0), Some(1.0)),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(1.0), Some(90.0)),
            metric("06037100200", Some(1.0), Some(85.0)),
        ]
        .into_iter()
        .collect();

        let engine = RecommendationEngine::default();
        assert!(engine.generate_recommendations(&tracts, &metrics).is_empty());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
