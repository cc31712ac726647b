//! Metadata assembly — slices the keyword set and truncates the description.

use crate::models::seo::{KeywordSet, SeoMetadata};
use crate::seo::scoring;

/// Hard character cap for `meta_description`. No word-boundary trimming.
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;
pub const META_KEYWORDS_MAX: usize = 10;
pub const SUGGESTED_TAGS_MAX: usize = 5;

/// Builds the final record. Output fields use the top slices of `keywords`,
/// while the score is computed over the full set.
pub fn optimize_metadata(description: &str, keywords: &KeywordSet) -> SeoMetadata {
    assemble_metadata(description, keywords, scoring::score(description, keywords))
}

/// Same as `optimize_metadata`, with the score already computed by the caller.
pub fn assemble_metadata(description: &str, keywords: &KeywordSet, seo_score: f64) -> SeoMetadata {
    let meta_description: String = description
        .chars()
        .take(META_DESCRIPTION_MAX_CHARS)
        .collect();
    let meta_keywords = keywords.top(META_KEYWORDS_MAX).join(",");
    let suggested_tags = keywords.top(SUGGESTED_TAGS_MAX).to_vec();

    SeoMetadata::new(meta_description, meta_keywords, suggested_tags, seo_score)
}
