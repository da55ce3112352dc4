//! Tabular (CSV) report writers.

use std::collections::BTreeMap;
use std::io::Write;

use care_access_geography_models::{CensusTract, Geoid};
use care_access_metrics_models::AccessMetric;
use care_access_policy_models::{PolicyRecommendation, SiteRecommendation};
use serde::Serialize;

use crate::ReportError;

/// Delimiter for list-valued fields flattened into a single CSV cell.
const LIST_DELIMITER: &str = " | ";

#[derive(Serialize)]
struct MetricsRow<'a> {
    #[serde(rename = "GEOID")]
    geoid: &'a Geoid,
    total_population: Option<u32>,
    median_income: Option<f64>,
    poverty_rate: Option<f64>,
    pct_no_vehicle: Option<f64>,
    centroid_lat: Option<f64>,
    centroid_lon: Option<f64>,
    area_sqkm: Option<f64>,
    nearest_facility_km: Option<f64>,
    avg_3_nearest_km: Option<f64>,
    facilities_within_5km: u32,
    access_score: Option<f64>,
}

/// Writes the combined tract-plus-metrics table, one row per tract in
/// input order.
///
/// # Errors
///
/// * `ReportError::Csv` / `ReportError::Io` on write failure
pub fn write_metrics_csv(
    writer: impl Write,
    tracts: &[CensusTract],
    metrics: &BTreeMap<Geoid, AccessMetric>,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for tract in tracts {
        let metric = metrics.get(&tract.geoid);
        csv_writer.serialize(MetricsRow {
            geoid: &tract.geoid,
            total_population: tract.total_population,
            median_income: tract.median_income,
            poverty_rate: tract.poverty_rate,
            pct_no_vehicle: tract.pct_no_vehicle,
            centroid_lat: tract.centroid_lat,
            centroid_lon: tract.centroid_lon,
            area_sqkm: tract.area_sqkm,
            nearest_facility_km: metric.and_then(|m| m.nearest_facility_km),
            avg_3_nearest_km: metric.and_then(|m| m.avg_3_nearest_km),
            facilities_within_5km: metric.map_or(0, |m| m.facilities_within_radius),
            access_score: metric.and_then(|m| m.access_score),
        })?;
    }

    csv_writer.flush()?;
    log::info!("Wrote metrics table for {} tracts", tracts.len());
    Ok(())
}

#[derive(Serialize)]
struct RecommendationRow {
    #[serde(rename = "Priority")]
    priority: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Affected_Population")]
    affected_population: u64,
    #[serde(rename = "Affected_Tracts_Count")]
    affected_tracts_count: usize,
    #[serde(rename = "Estimated_Cost")]
    estimated_cost: String,
    #[serde(rename = "Implementation_Timeframe")]
    implementation_timeframe: String,
    #[serde(rename = "Expected_Impact")]
    expected_impact: String,
    #[serde(rename = "Actionable_Steps")]
    actionable_steps: String,
    #[serde(rename = "Metrics_to_Track")]
    metrics_to_track: String,
}

/// Writes the flattened policy recommendation table.
///
/// # Errors
///
/// * `ReportError::Csv` / `ReportError::Io` on write failure
pub fn write_recommendations_csv(
    writer: impl Write,
    recommendations: &[PolicyRecommendation],
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for rec in recommendations {
        csv_writer.serialize(RecommendationRow {
            priority: rec.priority.to_string(),
            category: rec.category.to_string(),
            title: rec.title.clone(),
            description: rec.description.clone(),
            affected_population: rec.affected_population,
            affected_tracts_count: rec.affected_tracts.len(),
            estimated_cost: rec.estimated_cost.to_string(),
            implementation_timeframe: rec.implementation_timeframe.to_string(),
            expected_impact: rec.expected_impact.clone(),
            actionable_steps: rec.actionable_steps.join(LIST_DELIMITER),
            metrics_to_track: rec.metrics_to_track.join(LIST_DELIMITER),
        })?;
    }

    csv_writer.flush()?;
    log::info!("Wrote {} policy recommendations", recommendations.len());
    Ok(())
}

/// Writes the recommended facility site table.
///
/// # Errors
///
/// * `ReportError::Csv` / `ReportError::Io` on write failure
pub fn write_sites_csv(
    writer: impl Write,
    sites: &[SiteRecommendation],
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for site in sites {
        csv_writer.serialize(site)?;
    }
    csv_writer.flush()?;
    log::info!("Wrote {} recommended facility sites", sites.len());
    Ok(())
}
