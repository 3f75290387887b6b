#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Parking violation data sources.
//!
//! Sources are defined in embedded TOML ([`registry`]) and publish one CSV
//! per month ([`source_def`]). This crate lists those files, downloads them
//! ([`download`]), and reads and writes violation CSVs ([`csv_file`]).

pub mod csv_file;
pub mod download;
pub mod parsing;
pub mod registry;
pub mod source_def;

pub use csv_file::{read_csv_file, write_csv_file};
pub use download::fetch_dataset;
pub use registry::{DEFAULT_SOURCE_ID, all_sources, find_source, load_source_file};
pub use source_def::SourceDefinition;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source definition TOML is invalid.
    #[error("Invalid source definition: {0}")]
    Definition(#[from] toml::de::Error),

    /// The data did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Configuration for fetching data from a source.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of records to fetch.
    pub limit: Option<u64>,
    /// Maximum number of monthly files downloaded at once.
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            concurrency: 4,
        }
    }
}

/// Writes the unfilled dataset exactly as fetched, for later offline runs.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be written.
pub fn write_raw_csv(
    path: &std::path::Path,
    dataset: &parking_map_violation_models::Dataset,
) -> Result<(), SourceError> {
    log::info!("Dumping raw dataset to {}", path.display());
    write_csv_file(path, dataset)
}
