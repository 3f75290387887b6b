//! Source registry: loads source definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`].

use std::path::Path;

use crate::SourceError;
use crate::source_def::{SourceDefinition, parse_source_toml};

/// Identifier of the source used when none is named.
pub const DEFAULT_SOURCE_ID: &str = "dc_parking";

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[("dc_parking", include_str!("../sources/dc_parking.toml"))];

/// Returns all configured source definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the registry tests).
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a source definition by id.
#[must_use]
pub fn find_source(id: &str) -> Option<SourceDefinition> {
    all_sources().into_iter().find(|s| s.id == id)
}

/// Loads a source definition from a TOML file on disk, for sources not
/// baked into the binary.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not a valid
/// definition.
pub fn load_source_file(path: &Path) -> Result<SourceDefinition, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    let def = parse_source_toml(&contents)?;
    log::info!("Loaded source '{}' from {}", def.id(), path.display());
    Ok(def)
}
