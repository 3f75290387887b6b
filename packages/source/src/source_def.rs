//! TOML-driven definition of a monthly CSV source.
//!
//! A source publishes one CSV per calendar month. The definition names the
//! base URL, a file-name template with `{month}` and `{year}` placeholders,
//! the years covered, and any months that were never published.

use chrono::Month;
use serde::Deserialize;

/// Months that are missing from a given year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonthExclusion {
    /// Calendar year.
    pub year: i32,
    /// Full English month names (e.g. `"September"`).
    pub months: Vec<String>,
}

/// A monthly CSV source, parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g. `"dc_parking"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL prefix every monthly file lives under.
    pub base_url: String,
    /// File name with `{month}` and `{year}` placeholders.
    pub file_template: String,
    /// Years covered, in order.
    pub years: Vec<i32>,
    /// Months never published.
    #[serde(default)]
    pub exclude: Vec<MonthExclusion>,
}

/// One month's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyFile {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
    /// Full download URL.
    pub url: String,
}

impl SourceDefinition {
    /// Returns the source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the base URL (e.g. to point at a mirror).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.clone_into(&mut self.base_url);
        self
    }

    fn is_excluded(&self, year: i32, month: Month) -> bool {
        self.exclude
            .iter()
            .filter(|e| e.year == year)
            .any(|e| e.months.iter().any(|m| m.eq_ignore_ascii_case(month.name())))
    }

    /// Lists every published monthly file, year-major then month-minor.
    #[must_use]
    pub fn monthly_files(&self) -> Vec<MonthlyFile> {
        let mut files = Vec::new();
        for &year in &self.years {
            for number in 1..=12u8 {
                let Ok(month) = Month::try_from(number) else {
                    continue;
                };
                if self.is_excluded(year, month) {
                    continue;
                }
                let file_name = self
                    .file_template
                    .replace("{month}", month.name())
                    .replace("{year}", &year.to_string());
                files.push(MonthlyFile {
                    year,
                    month,
                    url: format!("{}{file_name}", self.base_url),
                });
            }
        }
        files
    }

    /// Lists every published monthly file URL.
    #[must_use]
    pub fn monthly_urls(&self) -> Vec<String> {
        self.monthly_files().into_iter().map(|f| f.url).collect()
    }
}

/// Parses a [`SourceDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, toml::de::Error> {
    toml::de::from_str(toml_str)
}
