#![forbid(unsafe_code)]

//! Fuzzy subsequence scoring for the command palette.
//!
//! # Model
//!
//! The haystack is the lowercase label followed by the keywords, space
//! separated. Query characters are matched greedily, left to right:
//!
//! ```text
//! match directly after previous match   +3   (contiguous run)
//! any other match                       +1
//! match at haystack position 0          +1   (bonus)
//! query not fully matched               -inf (excluded)
//! final                                 -0.1 * (haystack_len - query_len)
//! ```
//!
//! Lengths are counted in chars. A blank query scores every item `0.0`.
//!
//! # Invariants
//!
//! 1. Determinism: same input gives an identical score.
//! 2. Non-matches are exactly `f64::NEG_INFINITY`.

use super::CommandItem;

/// Per-match score for characters that extend a contiguous run.
pub const CONTIGUOUS_BONUS: f64 = 3.0;
/// Per-match score for characters after a gap.
pub const GAP_SCORE: f64 = 1.0;
/// Extra score for matching the very first haystack character.
pub const LEADING_BONUS: f64 = 1.0;
/// Penalty per unmatched haystack character.
pub const LENGTH_PENALTY: f64 = 0.1;

/// Ranks one item against one query.
///
/// Return `f64::NEG_INFINITY` to exclude the item.
pub trait Scorer: Send + Sync {
    /// Score `item` for `query`.
    fn score(&self, query: &str, item: &CommandItem) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&str, &CommandItem) -> f64 + Send + Sync,
{
    fn score(&self, query: &str, item: &CommandItem) -> f64 {
        self(query, item)
    }
}

/// The built-in subsequence scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyScorer;

impl FuzzyScorer {
    /// Create the scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The lowercase text an item is matched against.
    #[must_use]
    pub fn haystack(item: &CommandItem) -> String {
        let mut hay = item.label.to_lowercase();
        for keyword in &item.keywords {
            hay.push(' ');
            hay.push_str(&keyword.to_lowercase());
        }
        hay
    }
}

impl Scorer for FuzzyScorer {
    fn score(&self, query: &str, item: &CommandItem) -> f64 {
        score_subsequence(query, &Self::haystack(item))
    }
}

/// Score `query` as a subsequence of `haystack`.
///
/// Both sides are compared lowercase.
#[must_use]
pub fn score_subsequence(query: &str, haystack: &str) -> f64 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0.0;
    }
    let hay: Vec<char> = haystack.to_lowercase().chars().collect();
    let mut score = 0.0;
    let mut cursor = 0usize;
    let mut prev: Option<usize> = None;
    let mut query_len = 0usize;

    for qc in query.chars() {
        query_len += 1;
        let Some(offset) = hay[cursor..].iter().position(|&hc| hc == qc) else {
            return f64::NEG_INFINITY;
        };
        let pos = cursor + offset;
        score += match prev {
            Some(p) if p + 1 == pos => CONTIGUOUS_BONUS,
            _ => GAP_SCORE,
        };
        if pos == 0 {
            score += LEADING_BONUS;
        }
        prev = Some(pos);
        cursor = pos + 1;
    }

    score - LENGTH_PENALTY * hay.len().saturating_sub(query_len) as f64
}

/// Best score across `scorers`; `NEG_INFINITY` if none is registered.
pub(crate) fn best_score(scorers: &[Box<dyn Scorer>], query: &str, item: &CommandItem) -> f64 {
    scorers
        .iter()
        .map(|s| s.score(query, item))
        .fold(f64::NEG_INFINITY, f64::max)
}
