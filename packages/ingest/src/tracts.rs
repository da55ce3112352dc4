//! Census tract table ingestion.
//!
//! Tract identity is load-bearing: a malformed or duplicate GEOID is a
//! hard failure, while missing per-tract attributes simply load as
//! absent and are handled downstream.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use care_access_geography_models::{BoundingBox, CensusTract, Geoid};
use care_access_metrics_models::AccessMetric;
use serde::Deserialize;

use crate::IngestError;

#[derive(Debug, Deserialize)]
struct RawTract {
    #[serde(rename = "GEOID")]
    geoid: String,
    #[serde(default)]
    total_population: Option<f64>,
    #[serde(default)]
    median_income: Option<f64>,
    #[serde(default)]
    poverty_rate: Option<f64>,
    #[serde(default)]
    pct_no_vehicle: Option<f64>,
    #[serde(default)]
    centroid_lat: Option<f64>,
    #[serde(default)]
    centroid_lon: Option<f64>,
    #[serde(default)]
    area_sqkm: Option<f64>,
    #[serde(default)]
    nearest_facility_km: Option<f64>,
    #[serde(default)]
    avg_3_nearest_km: Option<f64>,
    #[serde(default)]
    facilities_within_5km: Option<f64>,
    #[serde(default)]
    access_score: Option<f64>,
}

impl RawTract {
    fn to_tract(&self, bounds: &BoundingBox) -> Result<CensusTract, IngestError> {
        let geoid = Geoid::parse(&self.geoid)?;

        // Census exports often carry populations as floats.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_population = self
            .total_population
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| p.round() as u32);

        let centroid_in_bounds = self
            .centroid_lat
            .zip(self.centroid_lon)
            .is_some_and(|(lat, lon)| bounds.contains(lat, lon));
        if self.centroid_lat.is_some() && !centroid_in_bounds {
            log::warn!("Tract {geoid} centroid is outside the study area; treating as unknown");
        }

        Ok(CensusTract {
            geoid,
            total_population,
            median_income: self.median_income,
            poverty_rate: self.poverty_rate,
            pct_no_vehicle: self.pct_no_vehicle,
            centroid_lat: self.centroid_lat.filter(|_| centroid_in_bounds),
            centroid_lon: self.centroid_lon.filter(|_| centroid_in_bounds),
            area_sqkm: self.area_sqkm,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn metric(&self, geoid: Geoid) -> AccessMetric {
        AccessMetric {
            geoid,
            nearest_facility_km: self.nearest_facility_km,
            avg_3_nearest_km: self.avg_3_nearest_km,
            facilities_within_radius: self
                .facilities_within_5km
                .filter(|c| c.is_finite() && *c >= 0.0)
                .map_or(0, |c| c.round() as u32),
            access_score: self.access_score,
        }
    }
}

/// Reads the census tract table from `path`.
///
/// # Errors
///
/// * `IngestError::MissingFile` when `path` does not exist
/// * `IngestError::Io` / `IngestError::Csv` on unreadable or malformed
///   input
/// * `IngestError::Geoid` / `IngestError::DuplicateGeoid` on invalid
///   tract identity
pub fn read_tracts(path: &Path, bounds: &BoundingBox) -> Result<Vec<CensusTract>, IngestError> {
    if !path.exists() {
        return Err(IngestError::MissingFile(path.to_path_buf()));
    }
    log::info!("Loading census tracts from {}", path.display());
    read_tracts_from(File::open(path)?, bounds)
}

/// Reader-based variant of [`read_tracts`]. Extra columns (such as
/// previously computed metrics) are ignored.
///
/// # Errors
///
/// See [`read_tracts`].
pub fn read_tracts_from(
    reader: impl Read,
    bounds: &BoundingBox,
) -> Result<Vec<CensusTract>, IngestError> {
    Ok(read_raw(reader, bounds)?.into_iter().map(|(t, _)| t).collect())
}

/// Reads a combined tract-plus-metrics table, as written by a previous
/// metrics run.
///
/// # Errors
///
/// See [`read_tracts`].
pub fn read_combined(
    path: &Path,
    bounds: &BoundingBox,
) -> Result<(Vec<CensusTract>, BTreeMap<Geoid, AccessMetric>), IngestError> {
    if !path.exists() {
        return Err(IngestError::MissingFile(path.to_path_buf()));
    }
    log::info!("Loading combined tract metrics from {}", path.display());
    read_combined_from(File::open(path)?, bounds)
}

/// Reader-based variant of [`read_combined`].
///
/// # Errors
///
/// See [`read_tracts`].
pub fn read_combined_from(
    reader: impl Read,
    bounds: &BoundingBox,
) -> Result<(Vec<CensusTract>, BTreeMap<Geoid, AccessMetric>), IngestError> {
    let rows = read_raw(reader, bounds)?;
    let metrics = rows
        .iter()
        .map(|(tract, metric)| (tract.geoid.clone(), metric.clone()))
        .collect();
    let tracts = rows.into_iter().map(|(t, _)| t).collect();
    Ok((tracts, metrics))
}

fn read_raw(
    reader: impl Read,
    bounds: &BoundingBox,
) -> Result<Vec<(CensusTract, AccessMetric)>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut seen = std::collections::BTreeSet::new();
    let mut rows = Vec::new();

    for row in csv_reader.deserialize() {
        let raw: RawTract = row?;
        let tract = raw.to_tract(bounds)?;
        if !seen.insert(tract.geoid.clone()) {
            return Err(IngestError::DuplicateGeoid(tract.geoid));
        }
        let metric = raw.metric(tract.geoid.clone());
        rows.push((tract, metric));
    }

    log::info!("Loaded {} census tracts", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "GEOID,total_population,median_income,poverty_rate,pct_no_vehicle,centroid_lat,centroid_lon,area_sqkm\n";

    #[test]
    fn reads_full_rows() {
        let csv = format!(
            "{HEADER}06037100100,3200,65000,12.5,8.0,34.05,-118.25,2.5\n"
        );
        let tracts = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();

        assert_eq!(tracts.len(), 1);
        let tract = &tracts[0];
        assert_eq!(tract.geoid.to_string(), "06037100100");
        assert_eq!(tract.total_population, Some(3200));
        assert_eq!(tract.median_income, Some(65_000.0));
        assert_eq!(tract.centroid(), Some((34.05, -118.25)));
    }

    #[test]
    fn missing_attributes_load_as_absent() {
        let csv = format!("{HEADER}06037100100,,,,,,,\n");
        let tracts = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();

        let tract = &tracts[0];
        assert_eq!(tract.total_population, None);
        assert_eq!(tract.median_income, None);
        assert_eq!(tract.centroid(), None);
    }

    #[test]
    fn float_population_is_rounded() {
        let csv = format!("{HEADER}06037100100,3200.0,,,,,,\n");
        let tracts = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();
        assert_eq!(tracts[0].total_population, Some(3200));
    }

    #[test]
    fn malformed_geoid_is_a_hard_error() {
        let csv = format!("{HEADER}12345,1000,,,,,,\n");
        let result = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY);
        assert!(matches!(result, Err(IngestError::Geoid(_))));
    }

    #[test]
    fn duplicate_geoid_is_a_hard_error() {
        let csv = format!(
            "{HEADER}06037100100,1000,,,,,,\n06037100100,2000,,,,,,\n"
        );
        let result = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY);
        assert!(matches!(result, Err(IngestError::DuplicateGeoid(_))));
    }

    #[test]
    fn out_of_bounds_centroid_becomes_unknown() {
        let csv = format!("{HEADER}06037100100,1000,,,,37.77,-122.42,\n");
        let tracts = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();
        assert_eq!(tracts[0].centroid(), None);
    }

    #[test]
    fn combined_file_splits_into_tracts_and_metrics() {
        let csv = "GEOID,total_population,median_income,centroid_lat,centroid_lon,\
                   nearest_facility_km,avg_3_nearest_km,facilities_within_5km,access_score\n\
                   06037100100,3200,65000,34.05,-118.25,2.4,4.7,3,72.5\n\
                   06037100200,1500,40000,34.10,-118.30,8.1,,0,31.0\n";
        let (tracts, metrics) =
            read_combined_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();

        assert_eq!(tracts.len(), 2);
        let metric = &metrics[&tracts[0].geoid];
        assert_eq!(metric.nearest_facility_km, Some(2.4));
        assert_eq!(metric.avg_3_nearest_km, Some(4.7));
        assert_eq!(metric.facilities_within_radius, 3);
        assert_eq!(metric.access_score, Some(72.5));
        assert_eq!(metrics[&tracts[1].geoid].avg_3_nearest_km, None);
    }

    #[test]
    fn plain_tract_read_ignores_metric_columns() {
        let csv = "GEOID,total_population,access_score\n06037100100,1000,55.0\n";
        let tracts = read_tracts_from(csv.as_bytes(), &BoundingBox::LA_COUNTY).unwrap();
        assert_eq!(tracts.len(), 1);
        assert_eq!(tracts[0].total_population, Some(1000));
    }
}
