//! Weighted-ratio string similarity.
//!
//! Scores are on a 0-100 scale. The base edit similarity comes from
//! [`strsim::normalized_levenshtein`]; the weighted ratio combines it with
//! token-order-insensitive and partial (substring) variants, scaled down so
//! an exact whole-string match always outranks them.

use std::collections::BTreeSet;

/// Scale applied to token-based ratios.
const UNBASE_SCALE: f64 = 0.95;

/// Length ratio below which partial ratios are not considered.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio above which partial ratios are scaled down further.
const LONG_PARTIAL_LENGTH_RATIO: f64 = 8.0;

/// Edit similarity of two whole strings.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Ratio of the two strings after sorting their whitespace-separated tokens.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Ratio that ignores duplicated tokens and rewards one token set being a
/// subset of the other.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let combined_ab = format!("{intersection} {diff_ab}").trim().to_string();
    let combined_ba = format!("{intersection} {diff_ba}").trim().to_string();

    ratio(&intersection, &combined_ab)
        .max(ratio(&intersection, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

/// Best ratio of the shorter string against every equally long window of
/// the longer one.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let window = shorter.chars().count();
    if window == 0 {
        return 0.0;
    }

    let longer: Vec<char> = longer.chars().collect();
    let mut best = 0.0_f64;
    for start in 0..=(longer.len() - window) {
        let slice: String = longer[start..start + window].iter().collect();
        best = best.max(ratio(shorter, &slice));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Partial ratio over token sets. Any shared token scores 100.
#[must_use]
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.intersection(&tokens_b).next().is_some() {
        return 100.0;
    }

    partial_ratio(&join(tokens_a.iter()), &join(tokens_b.iter()))
}

/// Weighted combination of the ratios above, chosen by how different the
/// two string lengths are.
#[must_use]
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;

    let base = ratio(a, b);

    if len_ratio < PARTIAL_LENGTH_RATIO {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < LONG_PARTIAL_LENGTH_RATIO {
        0.9
    } else {
        0.6
    };

    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

/// Finds the best-scoring candidate for `query`.
///
/// Returns the candidate's index and score. When several candidates share
/// the highest score the first one wins. Returns `None` for an empty query
/// or an empty candidate list.
#[must_use]
pub fn best_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<(usize, f64)> {
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let score = weighted_ratio(query, candidate.as_ref());
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((i, score));
            if score >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert!((weighted_ratio("1900 fake st nw", "1900 fake st nw") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_scores_zero() {
        assert!(weighted_ratio("", "abc").abs() < f64::EPSILON);
        assert!(weighted_ratio("abc", "").abs() < f64::EPSILON);
    }

    #[test]
    fn token_order_is_discounted_not_ignored() {
        let score = weighted_ratio("fake st 1900 nw", "1900 fake st nw");
        assert!((score - 95.0).abs() < 1e-9, "score: {score}");
    }

    #[test]
    fn token_subset_scores_full_set_ratio() {
        assert!((token_set_ratio("main st", "main st nw") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert!((partial_ratio("fake st", "1900 fake st nw") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn closer_address_scores_higher() {
        let close = weighted_ratio("1900 fake st nw", "1901 fake st nw");
        let far = weighted_ratio("1900 fake st nw", "400 other ave se");
        assert!(close > far);
    }

    #[test]
    fn best_match_prefers_first_on_tie() {
        let candidates = ["1900 fake st nw", "1900 fake st nw"];
        assert_eq!(
            best_match("1900 fake st nw", &candidates).map(|(i, _)| i),
            Some(0)
        );
    }

    #[test]
    fn best_match_picks_highest() {
        let candidates = ["400 other ave se", "1901 fake st nw", "1900 fake st ne"];
        let (i, _) = best_match("1900 fake st nw", &candidates).unwrap();
        assert!(i == 1 || i == 2);
        assert_ne!(i, 0);
    }

    #[test]
    fn best_match_handles_empty_inputs() {
        let none: [&str; 0] = [];
        assert_eq!(best_match("1900 fake st nw", &none), None);
        assert_eq!(best_match("", &["1900 fake st nw"]), None);
    }
}
