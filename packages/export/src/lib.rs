#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! GeoJSON export of parking violations.
//!
//! Each violation becomes a point feature at `[longitude, latitude]` (or a
//! `null` geometry while a coordinate is still missing). Features are
//! written one at a time, either as newline-delimited GeoJSON or as a
//! single `FeatureCollection` tagged with the WGS84 CRS.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_map_violation_models::{
    Dataset, ISSUE_DATE_COLUMN, ISSUE_TIME_COLUMN, LATITUDE_COLUMN, LOCATION_COLUMN,
    LONGITUDE_COLUMN, Violation,
};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder written for a missing issue date or time.
pub const MISSING_TIMESTAMP: &str = "NaT";

/// CRS name for WGS84 longitude/latitude.
pub const CRS_NAME: &str = "urn:ogc:def:crs:EPSG::4326";

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error (file create/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum ExportFormat {
    /// One feature per line (`.geojsonseq`).
    #[default]
    #[strum(serialize = "geojsonseq")]
    GeoJsonSeq,
    /// A single `FeatureCollection` document (`.geojson`).
    #[strum(serialize = "feature-collection")]
    FeatureCollection,
}

impl ExportFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::GeoJsonSeq => "geojsonseq",
            Self::FeatureCollection => "geojson",
        }
    }
}

fn point_geometry(violation: &Violation) -> Value {
    violation.coordinates().map_or(Value::Null, |c| {
        serde_json::json!({
            "type": "Point",
            "coordinates": [c.longitude, c.latitude]
        })
    })
}

fn properties(violation: &Violation) -> Map<String, Value> {
    let mut props: Map<String, Value> = violation
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    props.insert(
        LOCATION_COLUMN.to_owned(),
        violation
            .location
            .clone()
            .map_or(Value::Null, Value::String),
    );
    props.insert(LATITUDE_COLUMN.to_owned(), serde_json::json!(violation.latitude));
    props.insert(LONGITUDE_COLUMN.to_owned(), serde_json::json!(violation.longitude));
    props.insert(
        ISSUE_DATE_COLUMN.to_owned(),
        Value::String(violation.issue_date.map_or_else(
            || MISSING_TIMESTAMP.to_owned(),
            |d| d.format("%Y-%m-%d").to_string(),
        )),
    );
    props.insert(
        ISSUE_TIME_COLUMN.to_owned(),
        Value::String(violation.issue_time.map_or_else(
            || MISSING_TIMESTAMP.to_owned(),
            |t| t.format("%H:%M:%S").to_string(),
        )),
    );

    props
}

/// Builds the GeoJSON feature for one violation.
#[must_use]
pub fn to_feature(violation: &Violation) -> Value {
    serde_json::json!({
        "type": "Feature",
        "geometry": point_geometry(violation),
        "properties": properties(violation),
    })
}

/// Writes every violation as a feature. Returns the number written.
///
/// # Errors
///
/// Returns [`ExportError`] if writing or serialization fails.
pub fn write_features<W: Write>(
    writer: &mut W,
    dataset: &Dataset,
    format: ExportFormat,
) -> Result<u64, ExportError> {
    let mut count: u64 = 0;

    if format == ExportFormat::FeatureCollection {
        let crs = serde_json::json!({
            "type": "name",
            "properties": { "name": CRS_NAME }
        });
        writer.write_all(b"{\"type\":\"FeatureCollection\",\"crs\":")?;
        serde_json::to_writer(&mut *writer, &crs)?;
        writer.write_all(b",\"features\":[")?;
    }

    for violation in &dataset.records {
        if format == ExportFormat::FeatureCollection && count > 0 {
            writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut *writer, &to_feature(violation))?;
        if format == ExportFormat::GeoJsonSeq {
            writer.write_all(b"\n")?;
        }
        count += 1;
    }

    if format == ExportFormat::FeatureCollection {
        writer.write_all(b"]}\n")?;
    }

    Ok(count)
}

/// Exports a dataset to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_geojson(
    path: &Path,
    dataset: &Dataset,
    format: ExportFormat,
) -> Result<u64, ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let count = write_features(&mut writer, dataset, format)?;
    writer.flush()?;

    let located = dataset.len() - dataset.missing_coordinates_count();
    log::info!(
        "Exported {count} features ({located} with coordinates) to {} as {format}",
        path.display()
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn sample() -> Dataset {
        let mut located = Violation::new(Some("500 MAIN ST NW"), Some(38.9), Some(-77.03));
        located.issue_date = NaiveDate::from_ymd_opt(2022, 1, 5);
        located.issue_time = NaiveTime::from_hms_opt(9, 30, 0);
        located
            .fields
            .insert("FINE_AMOUNT".to_string(), "30".to_string());

        let missing = Violation::new(Some("1900 FAKE ST NW"), None, Some(-77.0));
        Dataset::from_records(vec![located, missing])
    }

    #[test]
    fn builds_point_feature() {
        let feature = to_feature(&sample().records[0]);
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -77.03);
        assert_eq!(feature["geometry"]["coordinates"][1], 38.9);
        assert_eq!(feature["properties"]["LOCATION"], "500 MAIN ST NW");
        assert_eq!(feature["properties"]["ISSUE_DATE"], "2022-01-05");
        assert_eq!(feature["properties"]["ISSUE_TIME"], "09:30:00");
        assert_eq!(feature["properties"]["FINE_AMOUNT"], "30");
    }

    #[test]
    fn missing_values_use_null_geometry_and_nat() {
        let feature = to_feature(&sample().records[1]);
        assert!(feature["geometry"].is_null());
        assert!(feature["properties"]["LATITUDE"].is_null());
        assert_eq!(feature["properties"]["LONGITUDE"], -77.0);
        assert_eq!(feature["properties"]["ISSUE_DATE"], MISSING_TIMESTAMP);
        assert_eq!(feature["properties"]["ISSUE_TIME"], MISSING_TIMESTAMP);
    }

    #[test]
    fn writes_one_feature_per_line() {
        let mut out = Vec::new();
        let count = write_features(&mut out, &sample(), ExportFormat::GeoJsonSeq).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(text.lines().count(), 2);
        for line in text.lines() {
            let value: Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["type"], "Feature");
        }
    }

    #[test]
    fn writes_feature_collection_with_crs() {
        let mut out = Vec::new();
        write_features(&mut out, &sample(), ExportFormat::FeatureCollection).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["crs"]["properties"]["name"], CRS_NAME);
        assert_eq!(value["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_feature_collection_is_valid() {
        let mut out = Vec::new();
        let count =
            write_features(&mut out, &Dataset::default(), ExportFormat::FeatureCollection).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(count, 0);
        assert!(value["features"].as_array().unwrap().is_empty());
    }

    #[test]
    fn format_string_forms() {
        assert_eq!(
            "geojsonseq".parse::<ExportFormat>().unwrap(),
            ExportFormat::GeoJsonSeq
        );
        assert_eq!(
            "feature-collection".parse::<ExportFormat>().unwrap(),
            ExportFormat::FeatureCollection
        );
        assert_eq!(ExportFormat::FeatureCollection.to_string(), "feature-collection");
        assert_eq!(ExportFormat::FeatureCollection.extension(), "geojson");
    }

    #[test]
    fn writes_file() {
        let path = std::env::temp_dir()
            .join("parking_map_export_test")
            .join("violations.geojsonseq");
        let count = write_geojson(&path, &sample(), ExportFormat::GeoJsonSeq).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(count, 2);
        assert_eq!(text.lines().count(), 2);
    }
}
