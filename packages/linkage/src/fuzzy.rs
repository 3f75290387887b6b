//! Fuzzy linkage: approximate address matches validated by structure.
//!
//! Each distinct location still missing coordinates is normalized and
//! scored against every distinct normalized location that has both
//! coordinates. The best-scoring candidate is accepted only if its block,
//! street, and quadrant agree (see [`crate::validate`]).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use parking_map_violation_models::progress::ProgressCallback;
use parking_map_violation_models::{Coordinates, Dataset, Violation};
use rayon::prelude::*;

use crate::merge::{self, CoordinateMap};
use crate::normalize::normalize_address;
use crate::scorer::best_match;
use crate::validate::{MatchVerdict, validate_match};

/// Counts from one fuzzy-linkage pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyOutcome {
    /// Distinct non-trivial locations missing coordinates.
    pub unknown_locations: usize,
    /// Distinct normalized addresses with known coordinates.
    pub known_addresses: usize,
    /// Unknown locations that produced a best-match candidate.
    pub candidates: usize,
    /// Validation results for every candidate, by verdict.
    pub verdicts: BTreeMap<MatchVerdict, usize>,
    /// Axis values filled by the merge.
    pub filled: u64,
}

impl FuzzyOutcome {
    /// Number of candidates that passed validation.
    #[must_use]
    pub fn validated(&self) -> usize {
        self.verdicts
            .get(&MatchVerdict::Valid)
            .copied()
            .unwrap_or_default()
    }
}

/// A distinct location projected out of the dataset.
struct LocationRow<'a> {
    location: &'a str,
    normalized: String,
}

/// Distinct non-trivial locations of records matching `keep`, first
/// occurrence wins, paired with their normalized form and the coordinates of
/// that first occurrence.
fn distinct_locations<'a>(
    dataset: &'a Dataset,
    keep: impl Fn(&Violation) -> bool,
) -> Vec<(LocationRow<'a>, Option<Coordinates>)> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    dataset
        .records
        .iter()
        .filter(|r| keep(*r))
        .filter_map(|r| r.location_key().map(|l| (l, r.coordinates())))
        .filter(|(location, _)| seen.insert(*location))
        .map(|(location, coordinates)| {
            let row = LocationRow {
                location,
                normalized: normalize_address(location),
            };
            (row, coordinates)
        })
        .collect()
}

/// Builds the location → coordinates map for the fuzzy phase.
///
/// Map keys are the ORIGINAL location strings of the unknown records so the
/// merger can apply them directly. When one normalized address stands for
/// several known locations, the last one in dataset order supplies the
/// coordinates.
#[must_use]
pub fn fuzzy_coordinate_map(
    dataset: &Dataset,
    progress: &Arc<dyn ProgressCallback>,
) -> (CoordinateMap, FuzzyOutcome) {
    let unknowns: Vec<LocationRow<'_>> = distinct_locations(dataset, |r| r.needs_coordinates())
        .into_iter()
        .map(|(row, _)| row)
        .collect();
    let knowns = distinct_locations(dataset, |r| r.coordinates().is_some());

    let mut candidates: Vec<&str> = Vec::new();
    let mut known_lookup: HashMap<&str, Coordinates> = HashMap::new();
    for (row, coordinates) in &knowns {
        let Some(coordinates) = coordinates else {
            continue;
        };
        if known_lookup
            .insert(row.normalized.as_str(), *coordinates)
            .is_none()
        {
            candidates.push(row.normalized.as_str());
        }
    }

    let mut outcome = FuzzyOutcome {
        unknown_locations: unknowns.len(),
        known_addresses: candidates.len(),
        ..FuzzyOutcome::default()
    };

    log::debug!(
        "Fuzzy linkage: matching {} unknown locations against {} known addresses",
        outcome.unknown_locations,
        outcome.known_addresses
    );

    progress.set_total(unknowns.len() as u64);

    let best: Vec<Option<usize>> = unknowns
        .par_iter()
        .map(|row| {
            let found = best_match(&row.normalized, &candidates).map(|(i, _)| i);
            progress.inc(1);
            found
        })
        .collect();

    let mut map = CoordinateMap::new();
    for (row, found) in unknowns.iter().zip(best) {
        let Some(i) = found else {
            continue;
        };
        outcome.candidates += 1;

        let matched = candidates[i];
        let verdict = validate_match(&row.normalized, matched);
        *outcome.verdicts.entry(verdict).or_default() += 1;

        if !verdict.is_valid() {
            log::trace!("Rejected {:?} ~ {matched:?}: {verdict:?}", row.location);
            continue;
        }

        if let Some(coordinates) = known_lookup.get(matched) {
            log::trace!("Matched {:?} ~ {matched:?}", row.location);
            map.insert(row.location.to_owned(), *coordinates);
        }
    }

    (map, outcome)
}

/// Fills coordinates still missing after exact linkage using validated
/// fuzzy matches.
pub fn fuzzy_fill(dataset: &mut Dataset, progress: &Arc<dyn ProgressCallback>) -> FuzzyOutcome {
    let (map, mut outcome) = fuzzy_coordinate_map(dataset, progress);

    log::debug!(
        "Fuzzy linkage: {} candidates, {} validated, verdicts: {:?}",
        outcome.candidates,
        outcome.validated(),
        outcome.verdicts
    );

    outcome.filled = merge::apply(&map, dataset);
    outcome
}
