//! Monthly CSV downloads.
//!
//! Files are fetched a bounded number at a time and concatenated in
//! calendar order regardless of which download finishes first.

use std::sync::Arc;

use futures::StreamExt as _;
use parking_map_violation_models::Dataset;
use parking_map_violation_models::progress::ProgressCallback;

use crate::csv_file::read_dataset;
use crate::source_def::{MonthlyFile, SourceDefinition};
use crate::{FetchOptions, SourceError};

const USER_AGENT: &str = "parking-map/0.1 (https://github.com/julianonn/dc-parking-tickets)";

/// Builds the HTTP client used for every download.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the TLS backend cannot be initialized.
pub fn build_client() -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Downloads one CSV and parses it into a [`Dataset`].
///
/// # Errors
///
/// Returns [`SourceError`] on HTTP failure (including non-success status)
/// or malformed CSV.
pub async fn fetch_csv(
    client: &reqwest::Client,
    url: &str,
    max_records: Option<u64>,
) -> Result<Dataset, SourceError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    log::debug!("Downloaded {} bytes from {url}", bytes.len());

    read_dataset(bytes.as_ref(), max_records)
}

async fn fetch_monthly(
    client: &reqwest::Client,
    file: &MonthlyFile,
    max_records: Option<u64>,
) -> Result<Dataset, SourceError> {
    log::info!("Downloading {} {}: {}", file.month.name(), file.year, file.url);
    let dataset = fetch_csv(client, &file.url, max_records).await?;
    log::info!(
        "{} {}: {} records",
        file.month.name(),
        file.year,
        dataset.len()
    );
    Ok(dataset)
}

/// Downloads every monthly file of a source and concatenates them.
///
/// At most `options.concurrency` downloads are in flight. When
/// `options.limit` is set, downloading stops as soon as that many records
/// have been collected and the result is truncated to exactly the limit.
///
/// # Errors
///
/// Returns the first [`SourceError`] encountered. A single failed month
/// aborts the whole fetch.
pub async fn fetch_dataset(
    def: &SourceDefinition,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, SourceError> {
    let files = def.monthly_files();
    let client = build_client()?;

    log::info!(
        "[{}] Fetching {} monthly files ({} at a time)",
        def.id(),
        files.len(),
        options.concurrency.max(1)
    );
    progress.set_total(files.len() as u64);

    let mut downloads = futures::stream::iter(
        files
            .iter()
            .map(|file| fetch_monthly(&client, file, options.limit)),
    )
    .buffered(options.concurrency.max(1));

    let mut dataset = Dataset::default();
    while let Some(result) = downloads.next().await {
        dataset.append(result?);
        progress.inc(1);
        progress.set_message(format!("{} records", dataset.len()));

        if let Some(limit) = options.limit
            && dataset.len() as u64 >= limit
        {
            log::info!("[{}] Reached limit of {limit} records", def.id());
            dataset
                .records
                .truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            break;
        }
    }

    log::info!("[{}] Fetch complete -- {} records", def.id(), dataset.len());
    progress.finish(format!("[{}] download complete -- {} records", def.id(), dataset.len()));

    Ok(dataset)
}
