//! Applies a resolved location → coordinates map back onto a dataset.

use std::collections::BTreeMap;

use parking_map_violation_models::{Axis, Coordinates, Dataset};

/// Location key → known coordinates. Built once per phase and discarded
/// after it is applied.
pub type CoordinateMap = BTreeMap<String, Coordinates>;

/// Fills missing axis values from `map`, one axis at a time.
///
/// For every record and axis:
/// - a trivial location leaves the value unchanged
/// - a mapped location with a missing value gets `map[location][axis]`
/// - anything else is left alone (present values are never overwritten)
///
/// Non-finite values are then canonicalized to missing.
///
/// Returns the number of axis values filled.
pub fn apply(map: &CoordinateMap, dataset: &mut Dataset) -> u64 {
    let mut filled = 0u64;

    if !map.is_empty() {
        for &axis in Axis::all() {
            for record in &mut dataset.records {
                let Some(coordinates) = record.location_key().and_then(|l| map.get(l)).copied()
                else {
                    continue;
                };

                let slot = record.axis_mut(axis);
                if slot.is_none() {
                    *slot = Some(coordinates.axis(axis));
                    filled += 1;
                }
            }
        }
    }

    for record in &mut dataset.records {
        for &axis in Axis::all() {
            let slot = record.axis_mut(axis);
            if slot.is_some_and(|v| !v.is_finite()) {
                *slot = None;
            }
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_map_violation_models::Violation;

    fn map_of(entries: &[(&str, f64, f64)]) -> CoordinateMap {
        entries
            .iter()
            .map(|(l, lat, lon)| ((*l).to_string(), Coordinates::new(*lat, *lon)))
            .collect()
    }

    #[test]
    fn fills_missing_axes() {
        let mut ds = Dataset::from_records(vec![Violation::new(Some("500 MAIN ST NW"), None, None)]);
        let filled = apply(&map_of(&[("500 MAIN ST NW", 38.9, -77.0)]), &mut ds);
        assert_eq!(filled, 2);
        assert_eq!(ds.records[0].latitude, Some(38.9));
        assert_eq!(ds.records[0].longitude, Some(-77.0));
    }

    #[test]
    fn never_overwrites_present_values() {
        let mut ds = Dataset::from_records(vec![Violation::new(
            Some("500 MAIN ST NW"),
            Some(1.0),
            None,
        )]);
        let filled = apply(&map_of(&[("500 MAIN ST NW", 38.9, -77.0)]), &mut ds);
        assert_eq!(filled, 1);
        assert_eq!(ds.records[0].latitude, Some(1.0));
        assert_eq!(ds.records[0].longitude, Some(-77.0));
    }

    #[test]
    fn skips_unmapped_locations() {
        let mut ds = Dataset::from_records(vec![Violation::new(Some("1 OTHER ST SE"), None, None)]);
        assert_eq!(apply(&map_of(&[("500 MAIN ST NW", 38.9, -77.0)]), &mut ds), 0);
        assert!(ds.records[0].needs_coordinates());
    }

    #[test]
    fn skips_trivial_locations() {
        let mut ds = Dataset::from_records(vec![
            Violation::new(Some(" "), None, None),
            Violation::new(None, None, None),
        ]);
        assert_eq!(apply(&map_of(&[(" ", 38.9, -77.0)]), &mut ds), 0);
        assert_eq!(ds.missing_coordinates_count(), 2);
    }

    #[test]
    fn canonicalizes_non_finite_values() {
        let mut ds = Dataset::from_records(vec![Violation::new(
            Some("1 OTHER ST SE"),
            Some(f64::NAN),
            Some(f64::INFINITY),
        )]);
        apply(&CoordinateMap::new(), &mut ds);
        assert_eq!(ds.records[0].latitude, None);
        assert_eq!(ds.records[0].longitude, None);
    }
}
