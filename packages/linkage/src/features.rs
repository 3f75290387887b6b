//! Structural address features used to validate fuzzy matches.
//!
//! A DC-style quadrant address such as `"1900 fake st nw"` is split into
//! three components:
//! - block: `"1900"`
//! - street: `"fake st"`
//! - quadrant: `"nw"`
//!
//! All patterns expect input that has already been through
//! [`crate::normalize::normalize_address`] (lowercase, no punctuation).

use regex::Regex;
use std::sync::LazyLock;

/// Recognized street-type suffixes.
const STREET_TYPES: &str = "st|street|ave|avenue|pl|place|dr|drive|ct|court|blvd|boulevard\
                            |ln|lane|rd|road|pkwy|parkway|cir|circle|ter|terrace|plz|plaza\
                            |way|alley|row|roadway|walk|walkway|square|sq";

/// Regex for a block number, optionally followed by "block" / "blk".
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([0-9]+)(?:\s(?:block|blk))?(?:\s|$)").expect("valid regex")
});

/// Regex for a street name (numbered ordinal or bare word) followed by a
/// street type.
static STREET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:^|\s)([0-9]+(?:st|nd|rd|th)|[a-z]+) ({STREET_TYPES})(?:\s|$)"
    ))
    .expect("valid regex")
});

/// Regex for a city quadrant.
static QUADRANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (nw|ne|sw|se)(?:\s|$)").expect("valid regex"));

/// The block, street, and quadrant of a normalized address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFeatures {
    /// Block number digits (e.g. `"1900"`).
    pub block: String,
    /// Street name and type (e.g. `"fake st"`, `"16th st"`).
    pub street: String,
    /// Quadrant (`"nw"`, `"ne"`, `"sw"`, or `"se"`).
    pub quadrant: String,
}

impl AddressFeatures {
    /// Extracts features from a normalized address.
    ///
    /// Returns `None` when any component is missing. Such an address is
    /// infeasible to validate and can never take part in a validated fuzzy
    /// match on either side.
    #[must_use]
    pub fn extract(address: &str) -> Option<Self> {
        let block = BLOCK_RE.captures(address)?.get(1)?.as_str().to_string();

        let street_caps = STREET_RE.captures(address)?;
        let street = format!(
            "{} {}",
            street_caps.get(1)?.as_str(),
            street_caps.get(2)?.as_str()
        );

        let quadrant = QUADRANT_RE
            .captures(address)?
            .get(1)?
            .as_str()
            .to_string();

        Some(Self {
            block,
            street,
            quadrant,
        })
    }
}
