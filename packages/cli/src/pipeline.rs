//! Sequential batch pipeline: load -> metrics -> gaps -> recommendations
//! -> cost-benefit.
//!
//! Each stage is caught at this boundary: a failed stage is logged and
//! its dependents are skipped, but independent outputs still get
//! written. The caller checks the returned flag before trusting the
//! output directory.

use std::path::Path;
use std::time::Instant;

use care_access_costs::{CostBenefitEstimator, CostEstimate, CostModel};
use care_access_facility_models::Facility;
use care_access_geography_models::{BoundingBox, CensusTract};
use care_access_ingest::{read_facilities, read_tracts};
use care_access_metrics::AccessMetricsCalculator;
use care_access_metrics_models::MetricsConfig;
use care_access_policy::{GapClassifier, RecommendationEngine, group_thousands};
use care_access_policy_models::{PolicyConfig, PolicyRecommendation, SiteRecommendation};
use care_access_report::{
    create_output_file, write_cost_benefit_report, write_executive_summary, write_metrics_csv,
    write_recommendations_csv, write_sites_csv,
};
use indicatif::MultiProgress;

use crate::Cli;
use crate::logging::steps_bar;

const STAGES: u64 = 5;

/// Runs the full pipeline. Returns `true` when every stage succeeded.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn run(args: &Cli, multi: &MultiProgress) -> bool {
    let started = Instant::now();
    let bar = steps_bar(multi, "Analyzing healthcare access", STAGES);
    let mut ok = true;

    // Stage 1: load input tables. Nothing downstream can run without
    // them, so failures here abort the whole pipeline.
    let bounds = BoundingBox::LA_COUNTY;
    let facilities = match read_facilities(&args.facilities, &bounds) {
        Ok(facilities) => facilities,
        Err(e) => {
            log::error!("Failed to load facilities: {e}");
            return false;
        }
    };
    let tracts = match read_tracts(&args.tracts, &bounds) {
        Ok(tracts) => tracts,
        Err(e) => {
            log::error!("Failed to load census tracts: {e}");
            return false;
        }
    };
    bar.inc(1);

    // Stage 2: access metrics.
    let metrics_config = MetricsConfig {
        deg_to_km: args.deg_to_km,
        density_radius_km: args.density_radius_km,
        ..MetricsConfig::default()
    };
    let calculator = AccessMetricsCalculator::new(metrics_config);
    let metrics = calculator.compute_all(&tracts, &facilities);
    let summary = calculator.summary(&tracts, &facilities, args.desert_threshold_km);
    if let Some(rates) = &summary.per_capita {
        log::info!(
            "{} facilities serving {} residents ({:.2} per 10k)",
            rates.total_facilities,
            group_thousands(rates.total_population),
            rates.per_10k
        );
    }
    log::info!(
        "{} tracts beyond {}km affecting {} residents",
        summary.gap_count,
        args.desert_threshold_km,
        group_thousands(summary.gap_population)
    );

    let metrics_path = args.output_dir.join("reports/census_with_access_metrics.csv");
    if let Err(e) = write_table(&metrics_path, |file| {
        write_metrics_csv(file, &tracts, &metrics)
    }) {
        log::error!("Failed to write metrics table: {e}");
        ok = false;
    }
    bar.inc(1);

    // Stage 3: gap classification.
    let policy_config = PolicyConfig {
        desert_threshold_km: args.desert_threshold_km,
        ..PolicyConfig::default()
    };
    let classifier = GapClassifier::new(policy_config.clone());
    let deserts = classifier.access_deserts(&tracts, &metrics, args.desert_threshold_km);
    let vulnerable = classifier.vulnerable_populations(&tracts, &metrics);
    bar.inc(1);

    // Stage 4: recommendations.
    let engine = RecommendationEngine::new(policy_config);
    let recommendations = engine.generate_recommendations(&tracts, &metrics);
    let sites = engine.recommend_facility_sites(&tracts, &metrics, &deserts, &vulnerable, args.sites);

    let recommendations_dir = args.output_dir.join("policy_recommendations");
    if let Err(e) = write_table(&recommendations_dir.join("recommendations.csv"), |file| {
        write_recommendations_csv(file, &recommendations)
    }) {
        log::error!("Failed to write recommendations table: {e}");
        ok = false;
    }
    if let Err(e) = write_table(
        &recommendations_dir.join("recommended_facility_locations.csv"),
        |file| write_sites_csv(file, &sites),
    ) {
        log::error!("Failed to write facility site table: {e}");
        ok = false;
    }
    if let Err(e) = write_table(&recommendations_dir.join("EXECUTIVE_SUMMARY.txt"), |file| {
        write_executive_summary(file, &recommendations)
    }) {
        log::error!("Failed to write executive summary: {e}");
        ok = false;
    }
    bar.inc(1);

    // Stage 5: cost-benefit analysis.
    let estimator = CostBenefitEstimator::new(CostModel::default());
    let estimates = build_estimates(&estimator, &recommendations, &sites);
    if estimates.is_empty() {
        log::info!("No triggered recommendations; skipping cost-benefit analysis");
    } else {
        let cost_summary = estimator.summarize(&estimates, sites.len());
        if let Err(e) = write_table(
            &recommendations_dir.join("COST_BENEFIT_ANALYSIS.txt"),
            |file| write_cost_benefit_report(file, &estimates, &cost_summary, sites.len()),
        ) {
            log::error!("Failed to write cost-benefit analysis: {e}");
            ok = false;
        }
    }
    bar.inc(1);

    bar.finish_with_message(format!(
        "Analyzed {} tracts against {} facilities in {:.1?}",
        tracts.len(),
        facilities.len(),
        started.elapsed()
    ));
    log_recap(&tracts, &facilities, &recommendations, &sites, args);

    ok
}

/// One cost estimate per triggered category. Facility costs are sized
/// from the average estimated impact of a recommended site.
fn build_estimates(
    estimator: &CostBenefitEstimator,
    recommendations: &[PolicyRecommendation],
    sites: &[SiteRecommendation],
) -> Vec<CostEstimate> {
    let mut estimates = Vec::new();

    if !sites.is_empty() {
        let total_impact: u64 = sites.iter().map(|s| s.estimated_impact).sum();
        let average_served = total_impact / sites.len() as u64;
        estimates.push(estimator.estimate_facility(average_served));
    }

    for (keyword, estimate_fn) in [
        (
            "Mobile",
            CostBenefitEstimator::estimate_mobile_clinics
                as fn(&CostBenefitEstimator, u64) -> CostEstimate,
        ),
        ("Transportation", CostBenefitEstimator::estimate_transportation),
        ("Telehealth", CostBenefitEstimator::estimate_telehealth),
    ] {
        let population: u64 = recommendations
            .iter()
            .filter(|r| r.title.contains(keyword))
            .map(|r| r.affected_population)
            .sum();
        if population > 0 {
            estimates.push(estimate_fn(estimator, population));
        }
    }

    estimates
}

fn write_table<F>(path: &Path, write: F) -> Result<(), care_access_report::ReportError>
where
    F: FnOnce(std::fs::File) -> Result<(), care_access_report::ReportError>,
{
    let file = create_output_file(path)?;
    write(file)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn log_recap(
    tracts: &[CensusTract],
    facilities: &[Facility],
    recommendations: &[PolicyRecommendation],
    sites: &[SiteRecommendation],
    args: &Cli,
) {
    log::info!("Tracts analyzed: {}", tracts.len());
    log::info!("Facilities analyzed: {}", facilities.len());
    log::info!("Policy recommendations: {}", recommendations.len());
    log::info!("Recommended facility sites: {}", sites.len());
    log::info!("Output directory: {}", args.output_dir.display());
}
