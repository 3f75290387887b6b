//! Reading and writing violation CSVs.
//!
//! Typed columns (`LOCATION`, `LATITUDE`, `LONGITUDE`, `ISSUE_DATE`,
//! `ISSUE_TIME`) are parsed into [`Violation`] fields; every other column is
//! carried through verbatim. Column order is preserved on write.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use parking_map_violation_models::{
    Dataset, ISSUE_DATE_COLUMN, ISSUE_TIME_COLUMN, LATITUDE_COLUMN, LOCATION_COLUMN,
    LONGITUDE_COLUMN, Violation,
};

use crate::SourceError;
use crate::parsing::{
    format_csv_coordinate, format_csv_date, format_csv_time, parse_coordinate, parse_issue_date,
    parse_issue_time,
};

/// Parses a CSV stream into a [`Dataset`], stopping after `max_records` rows
/// when given.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the stream is not valid CSV, or
/// [`SourceError::Parse`] if it has no header row.
pub fn read_dataset<R: Read>(reader: R, max_records: Option<u64>) -> Result<Dataset, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(SourceError::Parse {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut records = Vec::new();
    for result in reader.records() {
        if max_records.is_some_and(|max| records.len() as u64 >= max) {
            break;
        }
        let row = result?;
        records.push(violation_from_row(&columns, &row));
    }

    Ok(Dataset { columns, records })
}

fn violation_from_row(columns: &[String], row: &csv::StringRecord) -> Violation {
    let mut violation = Violation::default();
    let mut fields = BTreeMap::new();

    for (column, value) in columns.iter().zip(row.iter()) {
        match column.as_str() {
            LOCATION_COLUMN => {
                violation.location = (!value.is_empty()).then(|| value.to_owned());
            }
            LATITUDE_COLUMN => violation.latitude = parse_coordinate(value),
            LONGITUDE_COLUMN => violation.longitude = parse_coordinate(value),
            ISSUE_DATE_COLUMN => violation.issue_date = parse_issue_date(value),
            ISSUE_TIME_COLUMN => violation.issue_time = parse_issue_time(value),
            _ => {
                fields.insert(column.clone(), value.to_owned());
            }
        }
    }

    violation.fields = fields;
    violation
}

/// Reads a local CSV file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed.
pub fn read_csv_file(path: &Path) -> Result<Dataset, SourceError> {
    log::info!("Reading {}", path.display());
    let dataset = read_dataset(File::open(path)?, None)?;
    log::info!("Read {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Writes a dataset as CSV using its column order.
///
/// # Errors
///
/// Returns [`SourceError`] if writing fails.
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> Result<(), SourceError> {
    let columns = dataset.column_names();
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&columns)?;

    for violation in &dataset.records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| cell(violation, column))
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn cell(violation: &Violation, column: &str) -> String {
    match column {
        LOCATION_COLUMN => violation.location.clone().unwrap_or_default(),
        LATITUDE_COLUMN => format_csv_coordinate(violation.latitude),
        LONGITUDE_COLUMN => format_csv_coordinate(violation.longitude),
        ISSUE_DATE_COLUMN => format_csv_date(violation.issue_date),
        ISSUE_TIME_COLUMN => format_csv_time(violation.issue_time),
        other => violation.fields.get(other).cloned().unwrap_or_default(),
    }
}

/// Writes a dataset to a CSV file, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be created or written.
pub fn write_csv_file(path: &Path, dataset: &Dataset) -> Result<(), SourceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_dataset(File::create(path)?, dataset)?;
    log::info!("Wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
TICKET_NUMBER, LOCATION ,LATITUDE,LONGITUDE,ISSUE_DATE,ISSUE_TIME,FINE_AMOUNT
1,500 MAIN ST NW,38.9,-77.03,2022/01/05 05:00:00+00,930,30
2,500 MAIN ST NW,,,2022/01/06 05:00:00+00,1415,50
3,,,,bad,9999,
";

    #[test]
    fn reads_typed_and_passthrough_columns() {
        let ds = read_dataset(CSV.as_bytes(), None).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.columns[1], "LOCATION");
        assert_eq!(ds.missing_coordinates_count(), 2);

        let first = &ds.records[0];
        assert_eq!(first.location.as_deref(), Some("500 MAIN ST NW"));
        assert_eq!(first.latitude, Some(38.9));
        assert_eq!(first.issue_date.unwrap().to_string(), "2022-01-05");
        assert_eq!(first.issue_time.unwrap().to_string(), "09:30:00");
        assert_eq!(first.fields["FINE_AMOUNT"], "30");
        assert_eq!(first.fields["TICKET_NUMBER"], "1");
        assert!(!first.fields.contains_key("LOCATION"));

        let last = &ds.records[2];
        assert_eq!(last.location, None);
        assert_eq!(last.issue_date, None);
        assert_eq!(last.issue_time, None);
    }

    #[test]
    fn stops_at_max_records() {
        let ds = read_dataset(CSV.as_bytes(), Some(2)).unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn tolerates_short_rows() {
        let ds = read_dataset("LOCATION,LATITUDE,LONGITUDE\n1900 FAKE ST NW\n".as_bytes(), None)
            .unwrap();
        assert_eq!(ds.records[0].location.as_deref(), Some("1900 FAKE ST NW"));
        assert!(ds.records[0].needs_coordinates());
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            read_dataset("".as_bytes(), None),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn writes_in_source_column_order() {
        let mut ds = read_dataset(CSV.as_bytes(), None).unwrap();
        ds.records[1].latitude = Some(38.9);
        ds.records[1].longitude = Some(-77.03);

        let mut out = Vec::new();
        write_dataset(&mut out, &ds).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "TICKET_NUMBER,LOCATION,LATITUDE,LONGITUDE,ISSUE_DATE,ISSUE_TIME,FINE_AMOUNT"
        );
        assert_eq!(lines[2], "2,500 MAIN ST NW,38.9,-77.03,2022-01-06,1415,50");
        assert_eq!(lines[3], "3,,,,,,");
    }

    #[test]
    fn file_round_trip_keeps_fills() {
        let path = std::env::temp_dir().join("parking_map_source_csv_file_test.csv");
        let mut ds = read_dataset(CSV.as_bytes(), None).unwrap();
        ds.records[1].latitude = Some(38.9);

        write_csv_file(&path, &ds).unwrap();
        let back = read_csv_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.columns, ds.columns);
        assert_eq!(back.records[1].latitude, Some(38.9));
        assert_eq!(back.records[1].longitude, None);
        assert_eq!(back.records[1].issue_time, ds.records[1].issue_time);
    }
}
