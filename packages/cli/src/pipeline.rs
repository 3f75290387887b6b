//! Fetch -> fill -> export orchestration.

use std::path::{Path, PathBuf};
use std::time::Instant;

use parking_map_cli_utils::{IndicatifProgress, MultiProgress};
use parking_map_export::{ExportFormat, write_geojson};
use parking_map_linkage::{LinkageSummary, fill_missing_coordinates};
use parking_map_source::{FetchOptions, SourceDefinition, fetch_dataset, read_csv_file};
use parking_map_violation_models::Dataset;

/// Where the pipeline writes its results.
pub struct Outputs {
    /// GeoJSON destination.
    pub geojson: PathBuf,
    pub format: ExportFormat,
    /// Unfilled dataset, written before linkage.
    pub raw_csv: Option<PathBuf>,
    /// Filled dataset.
    pub csv: Option<PathBuf>,
}

/// Downloads a source, fills coordinates, and exports.
pub async fn transform(
    multi: &MultiProgress,
    def: &SourceDefinition,
    options: &FetchOptions,
    outputs: &Outputs,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let progress = IndicatifProgress::downloads_bar(multi, &format!("Downloading {}", def.name()));
    let dataset = fetch_dataset(def, options, &progress).await?;

    if let Some(path) = &outputs.raw_csv {
        parking_map_source::write_raw_csv(path, &dataset)?;
    }

    fill_and_export(multi, dataset, outputs)?;

    log::info!("Transform complete in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Fills coordinates in a local CSV and exports.
pub fn fill(
    multi: &MultiProgress,
    input: &Path,
    outputs: &Outputs,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let dataset = read_csv_file(input)?;
    fill_and_export(multi, dataset, outputs)?;

    log::info!("Fill complete in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn fill_and_export(
    multi: &MultiProgress,
    mut dataset: Dataset,
    outputs: &Outputs,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::matching_bar(multi, "Fuzzy matching");
    let summary = fill_missing_coordinates(&mut dataset, &progress);
    log_summary(&summary);

    if let Some(path) = &outputs.csv {
        parking_map_source::write_csv_file(path, &dataset)?;
    }

    write_geojson(&outputs.geojson, &dataset, outputs.format)?;
    Ok(())
}

fn log_summary(summary: &LinkageSummary) {
    log::info!(
        "Linkage summary: {} records, {} missing before, {} after exact, {} after fuzzy",
        summary.records,
        summary.missing_before,
        summary.missing_after_exact,
        summary.missing_after_fuzzy
    );
    log::info!(
        "  exact: {} locations resolved ({} ambiguous), {} values filled",
        summary.exact.resolved_locations,
        summary.exact.ambiguous_locations,
        summary.exact.filled
    );
    log::info!(
        "  fuzzy: {} unknown vs {} known, {} candidates, {} validated, {} values filled",
        summary.fuzzy.unknown_locations,
        summary.fuzzy.known_addresses,
        summary.fuzzy.candidates,
        summary.fuzzy.validated(),
        summary.fuzzy.filled
    );
    for (verdict, count) in &summary.fuzzy.verdicts {
        log::debug!("    {verdict:?}: {count}");
    }
    log::info!("Recovered coordinates for {} records", summary.recovered());
}
