//! Classification of tracts into access deserts and vulnerable
//! populations.

use std::collections::BTreeMap;

use care_access_geography_models::{CensusTract, Geoid};
use care_access_metrics::stats;
use care_access_metrics_models::AccessMetric;
use care_access_policy_models::{DesertTract, PolicyConfig, VulnerableTract};

/// Thresholds tracts into ranked gap lists from computed access
/// metrics and tract demographics.
#[derive(Debug, Clone, Default)]
pub struct GapClassifier {
    config: PolicyConfig,
}

impl GapClassifier {
    /// Creates a classifier with explicit thresholds.
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Tracts farther than `threshold_km` from any facility, sorted
    /// descending by severity.
    ///
    /// Severity is `nearest_facility_km * total_population`, so an
    /// unpopulated tract always scores zero no matter how remote it is.
    /// Tracts with an unknown distance or unknown population are
    /// excluded rather than guessed at. The sort is stable, so ties
    /// keep their input order.
    #[must_use]
    pub fn access_deserts(
        &self,
        tracts: &[CensusTract],
        metrics: &BTreeMap<Geoid, AccessMetric>,
        threshold_km: f64,
    ) -> Vec<DesertTract> {
        log::info!("Identifying access deserts (>{threshold_km}km from facility)...");

        let mut deserts: Vec<DesertTract> = tracts
            .iter()
            .filter_map(|tract| {
                let nearest_km = metrics.get(&tract.geoid)?.nearest_facility_km?;
                let population = tract.total_population?;
                if nearest_km <= threshold_km {
                    return None;
                }
                Some(DesertTract {
                    geoid: tract.geoid.clone(),
                    nearest_facility_km: nearest_km,
                    total_population: population,
                    severity_score: nearest_km * f64::from(population),
                })
            })
            .collect();

        deserts.sort_by(|a, b| b.severity_score.total_cmp(&a.severity_score));

        let affected: u64 = deserts.iter().map(|d| u64::from(d.total_population)).sum();
        log::info!(
            "Identified {} access deserts affecting {affected} people",
            deserts.len()
        );

        deserts
    }

    /// Tracts with a vulnerable population AND poor access, sorted
    /// descending by priority.
    ///
    /// A tract is a candidate when ANY of income-below-set-median, high
    /// poverty, or low vehicle ownership holds; it is retained only
    /// when its access score is also below the low-access threshold.
    /// Missing demographic fields never satisfy a criterion, and
    /// missing population or score excludes the tract outright.
    #[must_use]
    pub fn vulnerable_populations(
        &self,
        tracts: &[CensusTract],
        metrics: &BTreeMap<Geoid, AccessMetric>,
    ) -> Vec<VulnerableTract> {
        log::info!("Identifying vulnerable populations with poor access...");

        let cfg = &self.config;
        let incomes: Vec<f64> = tracts.iter().filter_map(|t| t.median_income).collect();
        let median_income = stats::median(&incomes);

        let mut vulnerable: Vec<VulnerableTract> = tracts
            .iter()
            .filter_map(|tract| {
                let low_income = match (tract.median_income, median_income) {
                    (Some(income), Some(median)) => income < median,
                    _ => false,
                };
                let high_poverty = tract
                    .poverty_rate
                    .is_some_and(|rate| rate > cfg.high_poverty_pct);
                let no_vehicle = tract
                    .pct_no_vehicle
                    .is_some_and(|pct| pct > cfg.no_vehicle_pct);

                if !(low_income || high_poverty || no_vehicle) {
                    return None;
                }

                let access_score = metrics.get(&tract.geoid)?.access_score?;
                if access_score >= cfg.low_access_score {
                    return None;
                }

                let population = tract.total_population?;
                let poverty = tract.poverty_rate.unwrap_or(0.0);
                let priority_score = (100.0 - access_score)
                    * (f64::from(population) / 1000.0)
                    * (1.0 + poverty / 100.0);

                Some(VulnerableTract {
                    geoid: tract.geoid.clone(),
                    access_score,
                    total_population: population,
                    poverty_rate: tract.poverty_rate,
                    priority_score,
                })
            })
            .collect();

        vulnerable.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));

        let affected: u64 = vulnerable
            .iter()
            .map(|v| u64::from(v.total_population))
            .sum();
        log::info!(
            "Identified {} vulnerable areas affecting {affected} people",
            vulnerable.len()
        );

        vulnerable
    }
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

    #[test]
    fn deserts_are_the_beyond_threshold_subset_sorted_by_severity() {
        let tracts = vec![
            tract("06037100100", Some(1000), None, None, None),
            tract("06037100200", Some(5000), None, None, None),
            tract("06037100300", Some(100), None, None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(4.0), Some(60.0)),
            metric("06037100200", Some(8.0), Some(30.0)),
            metric("06037100300", Some(12.0), Some(10.0)),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        let deserts = classifier.access_deserts(&tracts, &metrics, 5.0);

        let geoids: Vec<String> = deserts.iter().map(|d| d.geoid.to_string()).collect();
        // 8km * 5000 = 40000 outranks 12km * 100 = 1200; the 4km tract
        // is not a desert at all.
        assert_eq!(geoids, vec!["06037100200", "06037100300"]);
        assert!((deserts[0].severity_score - 40_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unpopulated_desert_scores_zero_and_ranks_last() {
        let tracts = vec![
            tract("06037100100", Some(0), None, None, None),
            tract("06037100200", Some(10), None, None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(50.0), None),
            metric("06037100200", Some(50.0), None),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        let deserts = classifier.access_deserts(&tracts, &metrics, 5.0);

        assert_eq!(deserts.len(), 2);
        assert_eq!(deserts[0].geoid.to_string(), "06037100200");
        assert!((deserts[1].severity_score).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_preserve_input_order() {
        let tracts = vec![
            tract("06037100300", Some(1000), None, None, None),
            tract("06037100100", Some(1000), None, None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100300", Some(6.0), None),
            metric("06037100100", Some(6.0), None),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        let deserts = classifier.access_deserts(&tracts, &metrics, 5.0);
        let geoids: Vec<String> = deserts.iter().map(|d| d.geoid.to_string()).collect();
        assert_eq!(geoids, vec!["06037100300", "06037100100"]);
    }

    #[test]
    fn missing_distance_or_population_is_excluded() {
        let tracts = vec![
            tract("06037100100", None, None, None, None),
            tract("06037100200", Some(1000), None, None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(20.0), None),
            metric("06037100200", None, None),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        assert!(classifier.access_deserts(&tracts, &metrics, 5.0).is_empty());
    }

    #[test]
    fn vulnerable_requires_low_access_score() {
        // Both tracts are low-income candidates; only the one under the
        // score threshold is retained.
        let tracts = vec![
            tract("06037100100", Some(1000), Some(30_000.0), Some(20.0), None),
            tract("06037100200", Some(1000), Some(35_000.0), Some(20.0), None),
            tract("06037100300", Some(1000), Some(90_000.0), None, None),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(2.0), Some(40.0)),
            metric("06037100200", Some(2.0), Some(75.0)),
            metric("06037100300", Some(2.0), Some(40.0)),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        let vulnerable = classifier.vulnerable_populations(&tracts, &metrics);

        assert_eq!(vulnerable.len(), 1);
        assert_eq!(vulnerable[0].geoid.to_string(), "06037100100");
        for v in &vulnerable {
            assert!(v.access_score < 50.0);
        }
    }

    #[test]
    fn any_single_criterion_selects_a_candidate() {
        // High vehicle-free share alone qualifies, even with high income.
        let tracts = vec![
            tract("06037100100", Some(1000), Some(90_000.0), None, Some(12.0)),
            tract("06037100200", Some(1000), Some(90_000.0), None, Some(2.0)),
        ];
        let metrics: BTreeMap<Geoid, AccessMetric> = [
            metric("06037100100", Some(2.0), Some(30.0)),
            metric("06037100200", Some(2.0), Some(30.0)),
        ]
        .into_iter()
        .collect();

        let classifier = GapClassifier::default();
        let vulnerable = classifier.vulnerable_populations(&tracts, &metrics);
        assert_eq!(vulnerable.len(), 1);
        assert_eq!(vulnerable[0].geoid.to_string(), "06037100100");
    }

    #[test]
    fn priority_score_applies_poverty_multiplier() {
        let tracts = vec![tract(
            "06037100100",
            Some(2000),
            Some(20_000.0),
            Some(25.0),
            None,
        )];
        let metrics: BTreeMap<Geoid, AccessMetric> =
            [metric("06037100100", Some(2.0), Some(40.0))]
                .into_iter()
                .collect();

        let classifier = GapClassifier::default();
        let vulnerable = classifier.vulnerable_populations(&tracts, &metrics);

        // (100 - 40) * (2000/1000) * (1 + 25/100) = 150
        assert_eq!(vulnerable.len(), 1);
        assert!((vulnerable[0].priority_score - 150.0).abs() < 1e-9);
    }
}
