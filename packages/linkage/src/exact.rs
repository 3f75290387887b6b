//! Exact linkage: records sharing a byte-identical location string.

use std::collections::BTreeSet;

use parking_map_violation_models::Dataset;

use crate::merge::{self, CoordinateMap};

/// Counts from one exact-linkage pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactOutcome {
    /// Distinct non-trivial locations on records missing coordinates.
    pub wanted_locations: usize,
    /// Locations that resolved to a known coordinate pair.
    pub resolved_locations: usize,
    /// Locations seen with more than one distinct coordinate pair.
    pub ambiguous_locations: usize,
    /// Axis values filled by the merge.
    pub filled: u64,
}

/// Builds the location → coordinates map for the exact phase.
///
/// Keys are the distinct non-trivial locations of records that are missing
/// a coordinate. Values come from any record with that exact location whose
/// latitude and longitude are both present. When a location appears with
/// several distinct pairs, the last one in dataset order wins.
#[must_use]
pub fn exact_coordinate_map(dataset: &Dataset) -> (CoordinateMap, ExactOutcome) {
    let wanted: BTreeSet<&str> = dataset
        .records
        .iter()
        .filter(|r| r.needs_coordinates())
        .filter_map(|r| r.location_key())
        .collect();

    let mut map = CoordinateMap::new();
    let mut ambiguous: BTreeSet<&str> = BTreeSet::new();

    for record in &dataset.records {
        let (Some(location), Some(coordinates)) = (record.location_key(), record.coordinates())
        else {
            continue;
        };
        if !wanted.contains(location) {
            continue;
        }
        if let Some(previous) = map.insert(location.to_owned(), coordinates)
            && previous != coordinates
        {
            ambiguous.insert(location);
        }
    }

    for location in &ambiguous {
        log::debug!("Location {location:?} has several coordinate pairs; keeping the last");
    }

    let outcome = ExactOutcome {
        wanted_locations: wanted.len(),
        resolved_locations: map.len(),
        ambiguous_locations: ambiguous.len(),
        filled: 0,
    };

    (map, outcome)
}

/// Fills missing coordinates from records with the exact same location
/// string. Running it twice has the same effect as running it once.
pub fn exact_fill(dataset: &mut Dataset) -> ExactOutcome {
    let (map, mut outcome) = exact_coordinate_map(dataset);

    log::debug!(
        "Exact linkage: {} of {} wanted locations resolved ({} ambiguous)",
        outcome.resolved_locations,
        outcome.wanted_locations,
        outcome.ambiguous_locations
    );

    outcome.filled = merge::apply(&map, dataset);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_map_violation_models::Violation;

    fn dataset(rows: &[(Option<&str>, Option<f64>, Option<f64>)]) -> Dataset {
        Dataset::from_records(
            rows.iter()
                .map(|(l, lat, lon)| Violation::new(*l, *lat, *lon))
                .collect(),
        )
    }

    #[test]
    fn fills_from_identical_location() {
        let mut ds = dataset(&[
            (Some("500 MAIN ST NW"), Some(38.9), Some(-77.0)),
            (Some("500 MAIN ST NW"), None, None),
        ]);
        let outcome = exact_fill(&mut ds);
        assert_eq!(outcome.filled, 2);
        assert_eq!(ds.records[1].coordinates(), ds.records[0].coordinates());
    }

    #[test]
    fn does_not_link_different_raw_strings() {
        let mut ds = dataset(&[
            (Some("1900 fake st. nw"), Some(38.9), Some(-77.0)),
            (Some("1900 FAKE ST NW"), None, None),
        ]);
        assert_eq!(exact_fill(&mut ds).filled, 0);
        assert!(ds.records[1].needs_coordinates());
    }

    #[test]
    fn last_known_pair_wins() {
        let mut ds = dataset(&[
            (Some("500 MAIN ST NW"), Some(1.0), Some(2.0)),
            (Some("500 MAIN ST NW"), None, None),
            (Some("500 MAIN ST NW"), Some(3.0), Some(4.0)),
        ]);
        let outcome = exact_fill(&mut ds);
        assert_eq!(outcome.ambiguous_locations, 1);
        assert_eq!(ds.records[1].latitude, Some(3.0));
        assert_eq!(ds.records[1].longitude, Some(4.0));
    }

    #[test]
    fn partial_rows_are_not_sources() {
        let mut ds = dataset(&[
            (Some("500 MAIN ST NW"), Some(38.9), None),
            (Some("500 MAIN ST NW"), None, Some(-77.0)),
        ]);
        assert_eq!(exact_fill(&mut ds).filled, 0);
        assert_eq!(ds.records[0].latitude, Some(38.9));
        assert_eq!(ds.records[1].longitude, Some(-77.0));
    }

    #[test]
    fn fills_only_missing_axis() {
        let mut ds = dataset(&[
            (Some("500 MAIN ST NW"), Some(38.9), Some(-77.0)),
            (Some("500 MAIN ST NW"), Some(10.0), None),
        ]);
        assert_eq!(exact_fill(&mut ds).filled, 1);
        assert_eq!(ds.records[1].latitude, Some(10.0));
        assert_eq!(ds.records[1].longitude, Some(-77.0));
    }

    #[test]
    fn skips_trivial_locations() {
        let mut ds = dataset(&[
            (Some(""), Some(38.9), Some(-77.0)),
            (Some(""), None, None),
            (Some("  "), Some(38.9), Some(-77.0)),
            (Some("  "), None, None),
            (None, None, None),
        ]);
        let outcome = exact_fill(&mut ds);
        assert_eq!(outcome.wanted_locations, 0);
        assert_eq!(outcome.filled, 0);
        assert_eq!(ds.missing_coordinates_count(), 3);
    }

    #[test]
    fn is_idempotent() {
        let mut once = dataset(&[
            (Some("500 MAIN ST NW"), Some(38.9), Some(-77.0)),
            (Some("500 MAIN ST NW"), None, None),
            (Some("500 MAIN ST NW"), Some(5.0), None),
            (Some("1 OTHER ST SE"), None, None),
            (None, Some(1.0), Some(1.0)),
        ]);
        exact_fill(&mut once);
        let mut twice = once.clone();
        assert_eq!(exact_fill(&mut twice).filled, 0);
        assert_eq!(once, twice);
    }
}
