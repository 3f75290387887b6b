#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Parking violation records and the in-memory batch they live in.
//!
//! A [`Violation`] carries the three fields the coordinate linkage engine
//! cares about (`location`, `latitude`, `longitude`), the typed issue date
//! and time, and every other source column as opaque passthrough data.
//! A [`Dataset`] is an ordered batch of violations plus the source column
//! order used when writing them back out.

pub mod progress;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Source column holding the free-text block address.
pub const LOCATION_COLUMN: &str = "LOCATION";
/// Source column holding the latitude.
pub const LATITUDE_COLUMN: &str = "LATITUDE";
/// Source column holding the longitude.
pub const LONGITUDE_COLUMN: &str = "LONGITUDE";
/// Source column holding the issue date.
pub const ISSUE_DATE_COLUMN: &str = "ISSUE_DATE";
/// Source column holding the issue time as an `HHMM` integer.
pub const ISSUE_TIME_COLUMN: &str = "ISSUE_TIME";

/// Columns that are parsed into typed [`Violation`] fields rather than
/// carried in [`Violation::fields`].
pub const TYPED_COLUMNS: &[&str] = &[
    LOCATION_COLUMN,
    LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
    ISSUE_DATE_COLUMN,
    ISSUE_TIME_COLUMN,
];

/// One coordinate axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Axis {
    /// North/south position (WGS84).
    Latitude,
    /// East/west position (WGS84).
    Longitude,
}

impl Axis {
    /// Both axes, in the order the merger applies them.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Latitude, Self::Longitude]
    }
}

/// A fully known (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns the value for a single axis.
    #[must_use]
    pub const fn axis(self, axis: Axis) -> f64 {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }
}

/// Returns `true` if a location value can never be used as a join key:
/// absent, empty, or whitespace-only.
#[must_use]
pub fn is_trivial_location(location: Option<&str>) -> bool {
    location.is_none_or(|s| s.trim().is_empty())
}

/// A single parking violation ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Free-text block address (e.g. `"1900 BLOCK FAKE ST NW"`).
    pub location: Option<String>,
    /// Latitude, if known.
    pub latitude: Option<f64>,
    /// Longitude, if known.
    pub longitude: Option<f64>,
    /// Date the ticket was issued.
    pub issue_date: Option<NaiveDate>,
    /// Wall-clock time the ticket was issued.
    pub issue_time: Option<NaiveTime>,
    /// Every other source column, verbatim.
    pub fields: BTreeMap<String, String>,
}

impl Violation {
    /// Creates a violation with only the linkage-relevant fields set.
    #[must_use]
    pub fn new(location: Option<&str>, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            location: location.map(str::to_owned),
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// Returns the location as a join key, or `None` if it is trivial.
    #[must_use]
    pub fn location_key(&self) -> Option<&str> {
        let location = self.location.as_deref();
        if is_trivial_location(location) {
            None
        } else {
            location
        }
    }

    /// Returns the coordinate pair if both axes are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Returns `true` if either axis is missing.
    #[must_use]
    pub const fn needs_coordinates(&self) -> bool {
        self.latitude.is_none() || self.longitude.is_none()
    }

    /// Returns the value of one axis.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }

    /// Returns a mutable reference to one axis.
    pub const fn axis_mut(&mut self, axis: Axis) -> &mut Option<f64> {
        match axis {
            Axis::Latitude => &mut self.latitude,
            Axis::Longitude => &mut self.longitude,
        }
    }
}

/// An ordered, in-memory batch of violations.
///
/// Position is the only identity a record has. Duplicates are expected and
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column names in source order, typed columns included. Empty for
    /// datasets built in memory.
    pub columns: Vec<String>,
    /// The records, in source order.
    pub records: Vec<Violation>,
}

impl Dataset {
    /// Creates a dataset from records with no known column order.
    #[must_use]
    pub const fn from_records(records: Vec<Violation>) -> Self {
        Self {
            columns: Vec::new(),
            records,
        }
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset has no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records missing at least one coordinate.
    #[must_use]
    pub fn missing_coordinates_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.needs_coordinates())
            .count()
    }

    /// Column order for writing: the source order, or the typed columns when
    /// the dataset was built in memory.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        if self.columns.is_empty() {
            TYPED_COLUMNS.to_vec()
        } else {
            self.columns.iter().map(String::as_str).collect()
        }
    }

    /// Appends another batch, keeping record order and adding any columns
    /// not already known.
    pub fn append(&mut self, other: Self) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.records.extend(other.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_locations() {
        assert!(is_trivial_location(None));
        assert!(is_trivial_location(Some("")));
        assert!(is_trivial_location(Some(" ")));
        assert!(is_trivial_location(Some("  \t ")));
        assert!(!is_trivial_location(Some("500 MAIN ST NW")));
    }

    #[test]
    fn location_key_skips_whitespace() {
        assert_eq!(Violation::new(Some("   "), None, None).location_key(), None);
        assert_eq!(
            Violation::new(Some("500 MAIN ST NW"), None, None).location_key(),
            Some("500 MAIN ST NW")
        );
    }

    #[test]
    fn coordinates_require_both_axes() {
        assert!(Violation::new(Some("x"), Some(38.9), None).coordinates().is_none());
        let c = Violation::new(Some("x"), Some(38.9), Some(-77.0))
            .coordinates()
            .unwrap();
        assert!((c.axis(Axis::Latitude) - 38.9).abs() < f64::EPSILON);
        assert!((c.axis(Axis::Longitude) - -77.0).abs() < f64::EPSILON);
    }

    #[test]
    fn axis_mut_updates_field() {
        let mut v = Violation::new(Some("x"), None, None);
        *v.axis_mut(Axis::Longitude) = Some(-77.0);
        assert_eq!(v.longitude, Some(-77.0));
        assert!(v.needs_coordinates());
    }

    #[test]
    fn append_merges_columns_in_order() {
        let mut a = Dataset {
            columns: vec!["TICKET_NUMBER".to_string(), "FINE_AMOUNT".to_string()],
            records: vec![Violation::default()],
        };
        let b = Dataset {
            columns: vec!["FINE_AMOUNT".to_string(), "PLATE_STATE".to_string()],
            records: vec![Violation::default(), Violation::default()],
        };
        a.append(b);
        assert_eq!(a.columns, ["TICKET_NUMBER", "FINE_AMOUNT", "PLATE_STATE"]);
        assert_eq!(a.len(), 3);
        assert_eq!(a.missing_coordinates_count(), 3);
    }

    #[test]
    fn column_names_default_to_typed_columns() {
        let ds = Dataset::from_records(vec![]);
        assert_eq!(ds.column_names(), TYPED_COLUMNS);
    }

    #[test]
    fn axis_string_forms() {
        assert_eq!(Axis::Latitude.to_string(), "LATITUDE");
        assert_eq!("LONGITUDE".parse::<Axis>().unwrap(), Axis::Longitude);
    }
}
