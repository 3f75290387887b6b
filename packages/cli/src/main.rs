#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the parking violation map toolchain.
//!
//! Uses `indicatif-log-bridge` (via [`parking_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parking_map_export::ExportFormat;
use parking_map_source::{DEFAULT_SOURCE_ID, FetchOptions, SourceDefinition};

#[derive(Parser)]
#[command(
    name = "parking_map",
    about = "Fill in missing coordinates for DC parking violations and export GeoJSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every monthly file, fill missing coordinates, and export
    Transform {
        /// Output path (default: `output/parking_violations.<ext>`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output layout: `geojsonseq` or `feature-collection`
        #[arg(long, default_value = "geojsonseq", value_parser = parse_format)]
        format: ExportFormat,
        /// Also write the unfilled download to this CSV
        #[arg(long)]
        raw_csv: Option<PathBuf>,
        /// Also write the filled dataset to this CSV
        #[arg(long)]
        csv_output: Option<PathBuf>,
        /// Maximum number of records to fetch (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Number of monthly files downloaded at once
        #[arg(long, default_value = "4")]
        concurrency: usize,
        /// Download from this URL prefix instead of the configured one
        #[arg(long)]
        base_url: Option<String>,
        /// Source identifier from the built-in registry
        #[arg(long, default_value = DEFAULT_SOURCE_ID, conflicts_with = "source_file")]
        source: String,
        /// Load the source definition from a TOML file instead
        #[arg(long)]
        source_file: Option<PathBuf>,
    },
    /// Fill missing coordinates in a local CSV and export
    Fill {
        /// Violation CSV to read
        #[arg(long)]
        input: PathBuf,
        /// Output path (default: `output/parking_violations.<ext>`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output layout: `geojsonseq` or `feature-collection`
        #[arg(long, default_value = "geojsonseq", value_parser = parse_format)]
        format: ExportFormat,
        /// Also write the filled dataset to this CSV
        #[arg(long)]
        csv_output: Option<PathBuf>,
    },
    /// List configured sources and their monthly file URLs
    Sources,
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
        .map_err(|_| format!("unknown format '{s}' (expected geojsonseq or feature-collection)"))
}

fn default_output(format: ExportFormat) -> PathBuf {
    PathBuf::from(format!("output/parking_violations.{}", format.extension()))
}

fn resolve_source(
    id: &str,
    file: Option<&PathBuf>,
) -> Result<SourceDefinition, Box<dyn std::error::Error>> {
    if let Some(path) = file {
        return Ok(parking_map_source::load_source_file(path)?);
    }
    parking_map_source::find_source(id).ok_or_else(|| format!("Unknown source: {id}").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = parking_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            output,
            format,
            raw_csv,
            csv_output,
            limit,
            concurrency,
            base_url,
            source,
            source_file,
        } => {
            let mut def = resolve_source(&source, source_file.as_ref())?;
            if let Some(base_url) = base_url {
                def = def.with_base_url(&base_url);
            }
            let options = FetchOptions { limit, concurrency };

            pipeline::transform(
                &multi,
                &def,
                &options,
                &pipeline::Outputs {
                    geojson: output.unwrap_or_else(|| default_output(format)),
                    format,
                    raw_csv,
                    csv: csv_output,
                },
            )
            .await?;
        }
        Commands::Fill {
            input,
            output,
            format,
            csv_output,
        } => {
            pipeline::fill(
                &multi,
                &input,
                &pipeline::Outputs {
                    geojson: output.unwrap_or_else(|| default_output(format)),
                    format,
                    raw_csv: None,
                    csv: csv_output,
                },
            )?;
        }
        Commands::Sources => {
            for source in parking_map_source::all_sources() {
                println!("{:<20} {}", source.id(), source.name());
                println!("{}", "-".repeat(50));
                for url in source.monthly_urls() {
                    println!("  {url}");
                }
            }
        }
    }

    Ok(())
}
