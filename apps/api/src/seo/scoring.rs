//! SEO score — keyword presence plus a description-length bonus, normalized to 0–100.
//!
//! Algorithm:
//! 1. hits = keywords found (case-insensitive substring) in the description, each at most once
//! 2. bonus = +2 for 100–160 chars, +1 for > 160 chars, +0 otherwise
//! 3. score = min(100, (hits + bonus) / (keyword_count + 2) × 100), rounded to 2 decimals
//!    with ties to even

use thiserror::Error;
use tracing::error;

use crate::models::seo::KeywordSet;

/// Upper edge of the ideal meta-description length band (inclusive).
pub const IDEAL_MAX_CHARS: usize = 160;
/// Lower edge of the ideal meta-description length band (inclusive).
pub const IDEAL_MIN_CHARS: usize = 100;
const IDEAL_LENGTH_BONUS: u32 = 2;
const OVERLONG_BONUS: u32 = 1;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("score computation produced a non-finite value ({0})")]
    NonFinite(f64),
}

/// Length bonus, counted in characters.
pub fn length_bonus(description: &str) -> u32 {
    let len = description.chars().count();
    if (IDEAL_MIN_CHARS..=IDEAL_MAX_CHARS).contains(&len) {
        IDEAL_LENGTH_BONUS
    } else if len > IDEAL_MAX_CHARS {
        OVERLONG_BONUS
    } else {
        0
    }
}

/// Number of keywords present in the description. An empty keyword always matches.
pub fn keyword_hits(description: &str, keywords: &KeywordSet) -> u32 {
    let description_lower = description.to_lowercase();
    keywords
        .iter()
        .filter(|k| description_lower.contains(&k.to_lowercase()))
        .count() as u32
}

pub fn try_score(description: &str, keywords: &KeywordSet) -> Result<f64, ScoreError> {
    let raw = (keyword_hits(description, keywords) + length_bonus(description)) as f64;
    let denominator = (keywords.len() + 2) as f64;
    let normalized = (raw / denominator * 100.0).min(MAX_SCORE);
    let rounded = round2(normalized);
    if !rounded.is_finite() {
        return Err(ScoreError::NonFinite(rounded));
    }
    Ok(rounded)
}

/// Soft variant: a scoring fault is logged and scores 0.0.
pub fn score(description: &str, keywords: &KeywordSet) -> f64 {
    try_score(description, keywords).unwrap_or_else(|e| {
        error!(stage = "scoring", "SEO score calculation failed: {e}");
        0.0
    })
}

/// Two decimals, exact ties to even (3.125 → 3.12).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
