//! Address normalization for fuzzy comparison.
//!
//! The normalized form is only ever used as a comparison key. It is never
//! written back onto a record.

/// Normalizes an optional address. `None` passes through unchanged.
#[must_use]
pub fn normalize(input: Option<&str>) -> Option<String> {
    input.map(normalize_address)
}

/// Normalizes an address string.
///
/// The pipeline:
/// 1. Trim surrounding whitespace
/// 2. Lowercase
/// 3. Delete every character that is not an ASCII letter, digit, or space
///    (characters are removed, not replaced)
/// 4. Trim spaces exposed by the deletion, so the result is a fixed point
#[must_use]
pub fn normalize_address(input: &str) -> String {
    let kept: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    kept.trim_matches(' ').to_string()
}
