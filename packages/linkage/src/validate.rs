//! Structural validation of fuzzy address matches.
//!
//! A textually similar match is only accepted when block, street, and
//! quadrant agree. This keeps `"1900 fake st nw"` from borrowing the
//! coordinates of `"1900 fake st ne"` even though the strings are nearly
//! identical.

use crate::features::AddressFeatures;

/// Outcome of validating an (unknown, matched) pair of normalized addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchVerdict {
    /// All components agree.
    Valid,
    /// One side has no extractable block, street, or quadrant.
    Infeasible,
    /// Block numbers are too far apart.
    BlockMismatch,
    /// Street tokens differ.
    StreetMismatch,
    /// Quadrants differ.
    QuadrantMismatch,
}

impl MatchVerdict {
    /// Returns `true` for [`MatchVerdict::Valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validates that `matched` is a structurally plausible stand-in for
/// `unknown`. Both inputs must already be normalized.
///
/// Deterministic, but not required to be symmetric in its roles.
#[must_use]
pub fn validate_match(unknown: &str, matched: &str) -> MatchVerdict {
    let (Some(unknown), Some(matched)) = (
        AddressFeatures::extract(unknown),
        AddressFeatures::extract(matched),
    ) else {
        return MatchVerdict::Infeasible;
    };

    if !blocks_agree(&unknown.block, &matched.block) {
        return MatchVerdict::BlockMismatch;
    }
    if unknown.street != matched.street {
        return MatchVerdict::StreetMismatch;
    }
    if unknown.quadrant != matched.quadrant {
        return MatchVerdict::QuadrantMismatch;
    }

    MatchVerdict::Valid
}

/// Block numbers agree when identical, when their first two digits are
/// equal, or when one two-digit prefix is the other with a trailing zero
/// appended (`"1"` vs `"10"`). DC block numbering rounds to the hundred,
/// so `"1900"` and `"190"` both land here.
#[must_use]
pub fn blocks_agree(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let d1 = two_digit_prefix(a);
    let d2 = two_digit_prefix(b);

    d1 == d2 || d1 == format!("{d2}0") || d2 == format!("{d1}0")
}

/// First two characters of a block number. Block numbers are ASCII digits.
fn two_digit_prefix(block: &str) -> &str {
    block.get(..2).unwrap_or(block)
}
