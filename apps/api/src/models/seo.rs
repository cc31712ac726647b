use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered keywords in generation order. May be empty; never deduplicated or re-ranked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// The first `n` keywords (or all of them, if fewer).
    pub fn top(&self, n: usize) -> &[String] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Final per-item SEO record. Built only by `metadata::optimize_metadata`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoMetadata {
    meta_description: String,
    meta_keywords: String,
    suggested_tags: Vec<String>,
    seo_score: f64,
}

impl SeoMetadata {
    pub(crate) fn new(
        meta_description: String,
        meta_keywords: String,
        suggested_tags: Vec<String>,
        seo_score: f64,
    ) -> Self {
        Self {
            meta_description,
            meta_keywords,
            suggested_tags,
            seo_score,
        }
    }

    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    pub fn meta_keywords(&self) -> &str {
        &self.meta_keywords
    }

    pub fn suggested_tags(&self) -> &[String] {
        &self.suggested_tags
    }

    pub fn seo_score(&self) -> f64 {
        self.seo_score
    }
}

/// Pipeline stage that can fall back to a degraded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Keywords,
    Description,
    Scoring,
}

/// A stage that returned its soft-failure value instead of a real result.
#[derive(Debug, Clone, Serialize)]
pub struct Degradation {
    pub stage: Stage,
    pub reason: String,
}

/// Everything produced for one item.
#[derive(Debug, Clone, Serialize)]
pub struct SeoResult {
    pub keywords: KeywordSet,
    pub description: String,
    pub metadata: SeoMetadata,
    pub degradations: Vec<Degradation>,
    pub generated_at: DateTime<Utc>,
}

impl SeoResult {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
