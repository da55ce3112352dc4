//! Per-tract access metric computation.
//!
//! All operations are pure functions of the facility and tract tables:
//! nothing is cached or mutated between calls, so every run recomputes
//! fresh values and results are invariant to input ordering.

use std::collections::BTreeMap;

use care_access_facility_models::{Facility, FacilityCategory};
use care_access_geography_models::{CensusTract, Geoid};
use care_access_metrics_models::{
    AccessMetric, MetricsConfig, MetricsSummary, PerCapitaRates, ValueStats,
};
use care_access_spatial::SpatialIndex;

use crate::stats;

/// Neighbor count for the average-nearest-distance metric.
const AVG_NEAREST_COUNT: usize = 3;

/// Computes distance, density, and composite score metrics for a set of
/// census tracts against a facility table.
#[derive(Debug, Clone, Default)]
pub struct AccessMetricsCalculator {
    config: MetricsConfig,
}

impl AccessMetricsCalculator {
    /// Creates a calculator with explicit configuration.
    #[must_use]
    pub const fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Builds a spatial index over the (optionally category-filtered)
    /// facility set. `None` when the filtered set is empty — an expected
    /// real-world state (e.g. a county with no urgent care), not an error.
    fn build_index(
        &self,
        facilities: &[Facility],
        category: Option<FacilityCategory>,
    ) -> Option<SpatialIndex> {
        let points: Vec<(f64, f64)> = facilities
            .iter()
            .filter(|f| category.is_none_or(|c| f.category == c))
            .map(Facility::coords)
            .collect();

        match SpatialIndex::build_with_scale(&points, self.config.deg_to_km) {
            Ok(index) => Some(index),
            Err(_) => {
                log::warn!(
                    "No facilities found{}",
                    category.map_or_else(String::new, |c| format!(" for category: {c}"))
                );
                None
            }
        }
    }

    /// Distance from each tract centroid to the nearest facility, in
    /// kilometers.
    ///
    /// Tracts without a usable centroid map to `None` — never a default
    /// of zero (which would bias scores favorably) or infinity (which
    /// would bias severity unrealistically). Returns `None` when the
    /// (filtered) facility set is empty.
    #[must_use]
    pub fn nearest_distance(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
        category: Option<FacilityCategory>,
    ) -> Option<BTreeMap<Geoid, Option<f64>>> {
        let index = self.build_index(facilities, category)?;

        let distances: BTreeMap<Geoid, Option<f64>> = tracts
            .iter()
            .map(|tract| {
                let dist = tract
                    .centroid()
                    .map(|(lat, lon)| index.nearest(lat, lon).0);
                (tract.geoid.clone(), dist)
            })
            .collect();

        let valid = distances.values().filter(|d| d.is_some()).count();
        log::info!(
            "Calculated nearest-facility distances for {valid}/{} tracts",
            distances.len()
        );

        Some(distances)
    }

    /// Mean distance from each tract centroid to its `k` nearest
    /// facilities, in kilometers. With fewer than `k` facilities the
    /// mean runs over what exists, so it can never fall below the
    /// plain nearest distance.
    ///
    /// Missing-data behavior matches [`Self::nearest_distance`].
    #[must_use]
    pub fn avg_nearest_distance(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
        k: usize,
    ) -> Option<BTreeMap<Geoid, Option<f64>>> {
        let index = self.build_index(facilities, None)?;

        let averages = tracts
            .iter()
            .map(|tract| {
                let avg = tract.centroid().and_then(|(lat, lon)| {
                    let distances: Vec<f64> = index
                        .nearest_k(lat, lon, k)
                        .into_iter()
                        .map(|(distance, _)| distance)
                        .collect();
                    stats::mean(&distances)
                });
                (tract.geoid.clone(), avg)
            })
            .collect();

        Some(averages)
    }

    /// Number of facilities within `radius_km` of each tract centroid.
    ///
    /// Tracts with a missing centroid count zero. An empty facility set
    /// yields zero for every tract.
    #[must_use]
    pub fn count_within_radius(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
        radius_km: f64,
    ) -> BTreeMap<Geoid, u32> {
        let index = self.build_index(facilities, None);

        tracts
            .iter()
            .map(|tract| {
                let count = match (&index, tract.centroid()) {
                    (Some(index), Some((lat, lon))) => {
                        u32::try_from(index.within_radius(lat, lon, radius_km).len())
                            .unwrap_or(u32::MAX)
                    }
                    _ => 0,
                };
                (tract.geoid.clone(), count)
            })
            .collect()
    }

    /// Composite access score per tract, in `[0, 100]`, higher is better.
    ///
    /// A weighted sum of three components, each normalized against the
    /// current tract set's own maximum (scores are NOT comparable across
    /// runs with different tract or facility sets):
    ///
    /// - nearest-distance (inverse), worth `distance_weight`
    /// - facility count within the density radius, worth `density_weight`
    /// - population density, worth `pop_density_weight`; when density is
    ///   unknown for any tract, every tract gets the flat half-credit
    ///   default instead of a guess
    ///
    /// Tracts with an undefined distance score `None`. Returns `None`
    /// when the facility set is empty.
    #[must_use]
    pub fn composite_access_score(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
    ) -> Option<BTreeMap<Geoid, Option<f64>>> {
        let cfg = &self.config;

        let distances = self.nearest_distance(tracts, facilities, None)?;
        let max_dist = stats::max(
            &distances
                .values()
                .filter_map(|d| *d)
                .collect::<Vec<f64>>(),
        );

        let counts = self.count_within_radius(tracts, facilities, cfg.density_radius_km);
        let max_count = counts.values().copied().max().unwrap_or(0);

        // The population-density component only carries signal when every
        // tract has a known density; otherwise the whole component falls
        // back to the flat default rather than mixing real and guessed
        // values in one normalization.
        let densities: Option<Vec<f64>> = tracts
            .iter()
            .map(CensusTract::population_density)
            .collect();
        let max_density = densities.as_deref().and_then(stats::max);

        let scores = tracts
            .iter()
            .map(|tract| {
                let distance_score = distances.get(&tract.geoid).copied().flatten().map(|d| {
                    match max_dist {
                        Some(max) if max > 0.0 => (1.0 - d / max) * cfg.distance_weight,
                        _ => cfg.distance_weight,
                    }
                });

                let count = counts.get(&tract.geoid).copied().unwrap_or(0);
                let density_score = if max_count > 0 {
                    f64::from(count) / f64::from(max_count) * cfg.density_weight
                } else {
                    0.0
                };

                let pop_density_score = match (tract.population_density(), max_density) {
                    (Some(density), Some(max)) if max > 0.0 => {
                        density / max * cfg.pop_density_weight
                    }
                    _ => cfg.flat_pop_density_score,
                };

                let score = distance_score
                    .map(|d| (d + density_score + pop_density_score).clamp(0.0, 100.0));

                (tract.geoid.clone(), score)
            })
            .collect();

        Some(scores)
    }

    /// Overall facilities-per-capita rates for the study region.
    ///
    /// `None` when there are no facilities or the summed known population
    /// is zero.
    #[must_use]
    pub fn facilities_per_capita(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
    ) -> Option<PerCapitaRates> {
        let total_population: u64 = tracts
            .iter()
            .filter_map(|t| t.total_population)
            .map(u64::from)
            .sum();

        if facilities.is_empty() || total_population == 0 {
            log::warn!("Cannot compute per-capita rates: empty facilities or zero population");
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let rate = facilities.len() as f64 / total_population as f64;

        Some(PerCapitaRates {
            total_facilities: facilities.len() as u64,
            total_population,
            per_10k: rate * 10_000.0,
            per_100k: rate * 100_000.0,
        })
    }

    /// Assembles the full [`AccessMetric`] table, one row per tract.
    ///
    /// All sub-calculations run even when some tracts lack data; missing
    /// inputs degrade to the documented defaults instead of failing the
    /// whole computation.
    #[must_use]
    pub fn compute_all(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
    ) -> BTreeMap<Geoid, AccessMetric> {
        let distances = self.nearest_distance(tracts, facilities, None);
        let averages = self.avg_nearest_distance(tracts, facilities, AVG_NEAREST_COUNT);
        let counts = self.count_within_radius(tracts, facilities, self.config.density_radius_km);
        let scores = self.composite_access_score(tracts, facilities);

        tracts
            .iter()
            .map(|tract| {
                let geoid = tract.geoid.clone();
                let metric = AccessMetric {
                    nearest_facility_km: distances
                        .as_ref()
                        .and_then(|m| m.get(&geoid).copied().flatten()),
                    avg_3_nearest_km: averages
                        .as_ref()
                        .and_then(|m| m.get(&geoid).copied().flatten()),
                    facilities_within_radius: counts.get(&geoid).copied().unwrap_or(0),
                    access_score: scores.as_ref().and_then(|m| m.get(&geoid).copied().flatten()),
                    geoid: geoid.clone(),
                };
                (geoid, metric)
            })
            .collect()
    }

    /// Summary statistics over a full metrics run. `gap_threshold_km`
    /// defines the coverage-gap distance.
    #[must_use]
    pub fn summary(
        &self,
        tracts: &[CensusTract],
        facilities: &[Facility],
        gap_threshold_km: f64,
    ) -> MetricsSummary {
        let metrics = self.compute_all(tracts, facilities);

        let distances: Vec<f64> = metrics
            .values()
            .filter_map(|m| m.nearest_facility_km)
            .collect();
        let scores: Vec<f64> = metrics.values().filter_map(|m| m.access_score).collect();

        let gap_geoids: Vec<&Geoid> = metrics
            .values()
            .filter(|m| m.nearest_facility_km.is_some_and(|d| d > gap_threshold_km))
            .map(|m| &m.geoid)
            .collect();

        let gap_population: u64 = tracts
            .iter()
            .filter(|t| gap_geoids.contains(&&t.geoid))
            .filter_map(|t| t.total_population)
            .map(u64::from)
            .sum();

        MetricsSummary {
            per_capita: self.facilities_per_capita(tracts, facilities),
            distances: value_stats(&distances),
            scores: value_stats(&scores),
            gap_count: gap_geoids.len() as u64,
            gap_population,
        }
    }
}

fn value_stats(values: &[f64]) -> Option<ValueStats> {
    Some(ValueStats {
        mean: stats::mean(values)?,
        median: stats::median(values)?,
        min: stats::min(values)?,
        max: stats::max(values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_access_geography_models::Geoid;

    const EPS: f64 = 1e-9;

    fn facility(name: &str, category: FacilityCategory, lat: f64, lon: f64) -> Facility {
        Facility {
            name: name.to_string(),
            category,
            lat,
            lon,
        }
    }

    fn tract(geoid: &str, lat: Option<f64>, lon: Option<f64>, population: u32) -> CensusTract {
        CensusTract {
            geoid: Geoid::parse(geoid).unwrap(),
            total_population: Some(population),
            median_income: Some(60_000.0),
            poverty_rate: None,
            pct_no_vehicle: None,
            centroid_lat: lat,
            centroid_lon: lon,
            area_sqkm: None,
        }
    }

    fn geoid(s: &str) -> Geoid {
        Geoid::parse(s).unwrap()
    }

    #[test]
    fn colocated_tracts_have_zero_distance_and_equal_scores() {
        let facilities = vec![
            facility("A", FacilityCategory::Hospital, 34.0, -118.0),
            facility("B", FacilityCategory::Clinic, 34.2, -118.3),
            facility("C", FacilityCategory::Clinic, 34.4, -118.6),
        ];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 1000),
            tract("06037100200", Some(34.2), Some(-118.3), 2000),
            tract("06037100300", Some(34.4), Some(-118.6), 3000),
        ];

        let calc = AccessMetricsCalculator::default();
        let distances = calc
            .nearest_distance(&tracts, &facilities, None)
            .unwrap();
        for dist in distances.values() {
            assert!(dist.unwrap().abs() < EPS);
        }

        // Max distance is zero, so every tract gets the full distance
        // weight; density and flat population-density components are
        // identical across tracts, so all scores are equal and in range.
        let scores = calc.composite_access_score(&tracts, &facilities).unwrap();
        let values: Vec<f64> = scores.values().map(|s| s.unwrap()).collect();
        for pair in values.windows(2) {
            assert!((pair[0] - pair[1]).abs() < EPS);
        }
        for v in &values {
            assert!((0.0..=100.0).contains(v));
        }
        assert!(values[0] >= 50.0);
    }

    #[test]
    fn empty_category_filter_is_a_no_data_signal() {
        let facilities = vec![facility("A", FacilityCategory::Hospital, 34.0, -118.0)];
        let tracts = vec![tract("06037100100", Some(34.0), Some(-118.0), 1000)];

        let calc = AccessMetricsCalculator::default();
        let result =
            calc.nearest_distance(&tracts, &facilities, Some(FacilityCategory::UrgentCare));
        assert!(result.is_none());
    }

    #[test]
    fn category_filter_restricts_the_index() {
        let facilities = vec![
            facility("Hosp", FacilityCategory::Hospital, 34.0, -118.0),
            facility("Clinic", FacilityCategory::Clinic, 34.5, -118.0),
        ];
        let tracts = vec![tract("06037100100", Some(34.5), Some(-118.0), 1000)];

        let calc = AccessMetricsCalculator::default();
        let all = calc.nearest_distance(&tracts, &facilities, None).unwrap();
        assert!(all[&geoid("06037100100")].unwrap().abs() < EPS);

        let hospitals_only = calc
            .nearest_distance(&tracts, &facilities, Some(FacilityCategory::Hospital))
            .unwrap();
        let dist = hospitals_only[&geoid("06037100100")].unwrap();
        assert!((dist - 0.5 * 111.0).abs() < 1e-6);
    }

    #[test]
    fn missing_centroid_is_missing_not_zero() {
        let facilities = vec![facility("A", FacilityCategory::Hospital, 34.0, -118.0)];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 1000),
            tract("06037100200", None, None, 2000),
        ];

        let calc = AccessMetricsCalculator::default();
        let distances = calc.nearest_distance(&tracts, &facilities, None).unwrap();
        assert!(distances[&geoid("06037100100")].is_some());
        assert_eq!(distances[&geoid("06037100200")], None);

        let counts = calc.count_within_radius(&tracts, &facilities, 5.0);
        assert_eq!(counts[&geoid("06037100200")], 0);

        let scores = calc.composite_access_score(&tracts, &facilities).unwrap();
        assert_eq!(scores[&geoid("06037100200")], None);
    }

    #[test]
    fn avg_of_three_nearest_never_undercuts_the_nearest() {
        let facilities = vec![
            facility("A", FacilityCategory::Hospital, 34.0, -118.0),
            facility("B", FacilityCategory::Clinic, 34.05, -118.0),
            facility("C", FacilityCategory::Clinic, 34.2, -118.0),
        ];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 1000),
            tract("06037100200", None, None, 2000),
        ];

        let calc = AccessMetricsCalculator::default();
        let nearest = calc.nearest_distance(&tracts, &facilities, None).unwrap();
        let averages = calc
            .avg_nearest_distance(&tracts, &facilities, 3)
            .unwrap();

        // (0 + 0.05 + 0.2) * 111 / 3 km from the colocated tract.
        let avg = averages[&geoid("06037100100")].unwrap();
        assert!((avg - 9.25).abs() < 1e-6);
        assert!(avg >= nearest[&geoid("06037100100")].unwrap());
        assert_eq!(averages[&geoid("06037100200")], None);

        // Fewer facilities than neighbors averages over what exists.
        let short = calc
            .avg_nearest_distance(&tracts, &facilities[..1], 3)
            .unwrap();
        assert!(short[&geoid("06037100100")].unwrap().abs() < EPS);

        let metrics = calc.compute_all(&tracts, &facilities);
        let metric = &metrics[&geoid("06037100100")];
        assert_eq!(metric.avg_3_nearest_km, Some(avg));
    }

    #[test]
    fn scores_are_order_invariant() {
        let facilities = vec![
            facility("A", FacilityCategory::Hospital, 34.0, -118.0),
            facility("B", FacilityCategory::Clinic, 34.3, -118.4),
        ];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.1), 1000),
            tract("06037100200", Some(34.2), Some(-118.3), 2000),
            tract("06037100300", Some(34.6), Some(-118.6), 3000),
        ];

        let calc = AccessMetricsCalculator::default();
        let forward = calc.composite_access_score(&tracts, &facilities).unwrap();

        let mut reversed_tracts = tracts.clone();
        reversed_tracts.reverse();
        let mut reversed_facilities = facilities.clone();
        reversed_facilities.reverse();
        let backward = calc
            .composite_access_score(&reversed_tracts, &reversed_facilities)
            .unwrap();

        assert_eq!(forward.len(), backward.len());
        for (geoid, score) in &forward {
            let other = backward[geoid];
            match (score, other) {
                (Some(a), Some(b)) => assert!((a - b).abs() < EPS),
                (None, None) => {}
                _ => panic!("score mismatch for {geoid}"),
            }
        }
    }

    #[test]
    fn pop_density_component_normalizes_when_known_for_all() {
        let facilities = vec![facility("A", FacilityCategory::Hospital, 34.0, -118.0)];
        let mut tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 1000),
            tract("06037100200", Some(34.0), Some(-118.1), 4000),
        ];
        for t in &mut tracts {
            t.area_sqkm = Some(2.0);
        }

        let calc = AccessMetricsCalculator::default();
        let scores = calc.composite_access_score(&tracts, &facilities).unwrap();

        // Denser tract gets the full 20-point component, the other a
        // quarter of it; tract 2 is farther so its distance component is
        // zero while tract 1 takes the full 50.
        let near_sparse = scores[&geoid("06037100100")].unwrap();
        let far_dense = scores[&geoid("06037100200")].unwrap();
        assert!((near_sparse - (50.0 + 30.0 + 5.0)).abs() < 1e-6);
        assert!((far_dense - (0.0 + 0.0 + 20.0)).abs() < 1e-6);
    }

    #[test]
    fn no_facilities_yields_no_metrics_but_zero_counts() {
        let tracts = vec![tract("06037100100", Some(34.0), Some(-118.0), 1000)];

        let calc = AccessMetricsCalculator::default();
        assert!(calc.nearest_distance(&tracts, &[], None).is_none());
        assert!(calc.composite_access_score(&tracts, &[]).is_none());

        let counts = calc.count_within_radius(&tracts, &[], 5.0);
        assert_eq!(counts[&geoid("06037100100")], 0);

        let metrics = calc.compute_all(&tracts, &[]);
        let metric = &metrics[&geoid("06037100100")];
        assert_eq!(metric.nearest_facility_km, None);
        assert_eq!(metric.avg_3_nearest_km, None);
        assert_eq!(metric.facilities_within_radius, 0);
        assert_eq!(metric.access_score, None);
    }

    #[test]
    fn per_capita_rates() {
        let facilities = vec![
            facility("A", FacilityCategory::Hospital, 34.0, -118.0),
            facility("B", FacilityCategory::Clinic, 34.1, -118.1),
        ];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 15_000),
            tract("06037100200", Some(34.1), Some(-118.1), 5_000),
        ];

        let calc = AccessMetricsCalculator::default();
        let rates = calc.facilities_per_capita(&tracts, &facilities).unwrap();
        assert_eq!(rates.total_facilities, 2);
        assert_eq!(rates.total_population, 20_000);
        assert!((rates.per_10k - 1.0).abs() < EPS);
        assert!((rates.per_100k - 10.0).abs() < EPS);
    }

    #[test]
    fn per_capita_none_for_zero_population() {
        let facilities = vec![facility("A", FacilityCategory::Hospital, 34.0, -118.0)];
        let tracts = vec![tract("06037100100", Some(34.0), Some(-118.0), 0)];

        let calc = AccessMetricsCalculator::default();
        assert!(calc.facilities_per_capita(&tracts, &facilities).is_none());
    }

    #[test]
    fn summary_counts_coverage_gaps() {
        let facilities = vec![facility("A", FacilityCategory::Hospital, 34.0, -118.0)];
        let tracts = vec![
            tract("06037100100", Some(34.0), Some(-118.0), 1000),
            // About 0.1 degrees away (~11 km), beyond the 5 km threshold.
            tract("06037100200", Some(34.1), Some(-118.0), 2500),
        ];

        let calc = AccessMetricsCalculator::default();
        let summary = calc.summary(&tracts, &facilities, 5.0);
        assert_eq!(summary.gap_count, 1);
        assert_eq!(summary.gap_population, 2500);
        assert!(summary.distances.is_some());
        assert!(summary.scores.is_some());
    }
}
