//! Field parsing for parking violation CSV columns.
//!
//! Every parser returns `None` for values it cannot interpret rather than
//! failing the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Format used when writing `ISSUE_DATE` back out.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format used when writing `ISSUE_TIME` back to CSV (same shape as input).
pub const CSV_TIME_FORMAT: &str = "%H%M";

/// Parses an issue date.
///
/// Accepts plain ISO dates, ISO datetimes (with or without fractional
/// seconds and offset), and the `2023/01/15 05:00:00+00` form the monthly
/// files use.
#[must_use]
pub fn parse_issue_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }
    DateTime::parse_from_str(s, "%Y/%m/%d %H:%M:%S%#z")
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parses an issue time given as an `HHMM` integer (`"930"` is 09:30).
///
/// Values with a zero fractional part (`"930.0"`) are accepted, as are
/// `HH:MM` and `HH:MM:SS` strings. Anything longer than four digits or out
/// of range yields `None`.
#[must_use]
pub fn parse_issue_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.contains(':') {
        return NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok();
    }

    let digits = match s.split_once('.') {
        Some((whole, frac)) if frac.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => s,
    };
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    NaiveTime::parse_from_str(&format!("{digits:0>4}"), CSV_TIME_FORMAT).ok()
}

/// Parses a latitude or longitude. Empty, unparseable, and non-finite
/// values are missing.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats an optional date for CSV output (empty when missing).
#[must_use]
pub fn format_csv_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Formats an optional time for CSV output as `HHMM` (empty when missing).
#[must_use]
pub fn format_csv_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format(CSV_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Formats an optional coordinate for CSV output (empty when missing).
#[must_use]
pub fn format_csv_coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
