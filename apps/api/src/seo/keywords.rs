//! Keyword extraction — asks the oracle for keywords and splits its answer.

use crate::models::item::ItemFeatures;
use crate::models::seo::KeywordSet;
use crate::oracle::{GenerationOracle, OracleError};
use crate::seo::features::aggregate_features;
use crate::seo::prompts::{KEYWORD_PARAMS, KEYWORD_PROMPT_PREFIX};

/// Splits raw oracle output on `,` and trims each segment.
///
/// Empty segments are kept: downstream scoring divides by the raw segment count.
pub fn parse_keywords(raw: &str) -> KeywordSet {
    raw.split(',').map(str::trim).collect()
}

pub fn build_keyword_prompt(item: &ItemFeatures) -> String {
    format!("{KEYWORD_PROMPT_PREFIX}{}", aggregate_features(item))
}

/// Asks the oracle for keywords. An `Err` means the oracle was unavailable,
/// which callers can tell apart from an answer with no usable keywords.
/// `SeoPipeline` turns the error into an empty set.
pub async fn generate_keywords(
    item: &ItemFeatures,
    oracle: &dyn GenerationOracle,
) -> Result<KeywordSet, OracleError> {
    let prompt = build_keyword_prompt(item);
    let raw = oracle.generate(&prompt, &KEYWORD_PARAMS).await?;
    Ok(parse_keywords(&raw))
}
