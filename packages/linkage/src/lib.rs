#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate imputation for parking violation records.
//!
//! Many tickets arrive without a latitude/longitude but with a block
//! address that other tickets in the same batch were geocoded at. This
//! crate recovers those coordinates without calling any geocoder:
//!
//! 1. **Exact linkage** ([`exact`]) copies coordinates between records with
//!    byte-identical location strings.
//! 2. **Fuzzy linkage** ([`fuzzy`]) normalizes the remaining locations
//!    ([`normalize`]), finds the most similar known address ([`scorer`]),
//!    and accepts it only when block, street, and quadrant agree
//!    ([`features`], [`validate`]).
//!
//! Both phases apply their results through [`merge::apply`], which never
//! overwrites a coordinate that is already present and never touches
//! records with a trivial location.

pub mod exact;
pub mod features;
pub mod fuzzy;
pub mod merge;
pub mod normalize;
pub mod scorer;
pub mod validate;

use std::sync::Arc;

use parking_map_violation_models::Dataset;
use parking_map_violation_models::progress::ProgressCallback;

pub use exact::{ExactOutcome, exact_fill};
pub use fuzzy::{FuzzyOutcome, fuzzy_fill};
pub use merge::CoordinateMap;

/// What a full linkage run did to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkageSummary {
    /// Records in the dataset.
    pub records: usize,
    /// Records missing a coordinate before linkage.
    pub missing_before: usize,
    /// Records still missing a coordinate after exact linkage.
    pub missing_after_exact: usize,
    /// Records still missing a coordinate after fuzzy linkage.
    pub missing_after_fuzzy: usize,
    /// Exact phase counts.
    pub exact: ExactOutcome,
    /// Fuzzy phase counts.
    pub fuzzy: FuzzyOutcome,
}

impl LinkageSummary {
    /// Records whose coordinates were fully recovered.
    #[must_use]
    pub const fn recovered(&self) -> usize {
        self.missing_before.saturating_sub(self.missing_after_fuzzy)
    }
}

/// Runs exact linkage followed by fuzzy linkage over the whole dataset.
///
/// `progress` receives one tick per distinct unknown location during the
/// fuzzy search.
pub fn fill_missing_coordinates(
    dataset: &mut Dataset,
    progress: &Arc<dyn ProgressCallback>,
) -> LinkageSummary {
    let missing_before = dataset.missing_coordinates_count();
    log::info!(
        "Filling coordinates: {missing_before} of {} records missing",
        dataset.len()
    );

    log::info!("Exact linkage...");
    let exact = exact_fill(dataset);
    let missing_after_exact = dataset.missing_coordinates_count();
    log::info!(
        "Exact linkage done: {} values filled, {missing_after_exact} records still missing",
        exact.filled
    );

    log::info!("Fuzzy linkage...");
    progress.set_message("Fuzzy matching".to_string());
    let fuzzy = fuzzy_fill(dataset, progress);
    let missing_after_fuzzy = dataset.missing_coordinates_count();
    log::info!(
        "Fuzzy linkage done: {} of {} candidates validated, {} values filled, \
         {missing_after_fuzzy} records still missing",
        fuzzy.validated(),
        fuzzy.candidates,
        fuzzy.filled
    );
    progress.finish(format!(
        "Fuzzy matching complete -- {} validated matches",
        fuzzy.validated()
    ));

    LinkageSummary {
        records: dataset.len(),
        missing_before,
        missing_after_exact,
        missing_after_fuzzy,
        exact,
        fuzzy,
    }
}
