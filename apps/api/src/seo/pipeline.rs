//! SEO pipeline — orchestrates the per-item generation flow.
//!
//! Flow: aggregate features → keyword prompt → oracle → split keywords →
//!       description prompt → oracle → optimize metadata (scores internally).
//!
//! Stage failures never escape: each stage degrades to its empty value and the
//! failure is recorded on the result. Callers always get a complete `SeoResult`.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::models::item::ItemFeatures;
use crate::models::seo::{Degradation, SeoResult, Stage};
use crate::oracle::GenerationOracle;
use crate::seo::description::generate_description;
use crate::seo::keywords::generate_keywords;
use crate::seo::metadata::assemble_metadata;
use crate::seo::scoring;

/// Shared pipeline. Built once per process; holds the only oracle handle.
pub struct SeoPipeline {
    oracle: Arc<dyn GenerationOracle>,
    /// Items processed concurrently by `run_batch`.
    batch_size: usize,
}

impl SeoPipeline {
    pub fn new(oracle: Arc<dyn GenerationOracle>, batch_size: usize) -> Self {
        Self {
            oracle,
            batch_size: batch_size.max(1),
        }
    }

    pub fn model_id(&self) -> &str {
        self.oracle.model_id()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs every stage for one item, strictly in order.
    pub async fn run(&self, item: &ItemFeatures) -> SeoResult {
        let mut degradations = Vec::new();

        let keywords = recover(
            Stage::Keywords,
            &item.title,
            generate_keywords(item, self.oracle.as_ref()).await,
            &mut degradations,
        );
        let description = recover(
            Stage::Description,
            &item.title,
            generate_description(item, &keywords, self.oracle.as_ref()).await,
            &mut degradations,
        );

        let seo_score = recover(
            Stage::Scoring,
            &item.title,
            scoring::try_score(&description, &keywords),
            &mut degradations,
        );
        let metadata = assemble_metadata(&description, &keywords, seo_score);

        if degradations.is_empty() {
            info!(
                "Generated SEO metadata for '{}': score={}, keywords={}",
                item.title,
                metadata.seo_score(),
                keywords.len()
            );
        } else {
            warn!(
                "Generated degraded SEO metadata for '{}': score={}, degraded_stages={}",
                item.title,
                metadata.seo_score(),
                degradations.len()
            );
        }

        SeoResult {
            keywords,
            description,
            metadata,
            degradations,
            generated_at: Utc::now(),
        }
    }

    /// Runs many items, up to `batch_size` at a time. Output order matches input order.
    pub async fn run_batch(&self, items: &[ItemFeatures]) -> Vec<SeoResult> {
        info!(
            "Processing batch of {} items (concurrency {})",
            items.len(),
            self.batch_size
        );

        // Futures are built up front so the stream does not capture a closure
        // borrowing `self`; axum needs the handler future to be `Send`.
        let pending: Vec<_> = items.iter().map(|item| self.run(item)).collect();
        let results: Vec<SeoResult> = stream::iter(pending)
            .buffered(self.batch_size)
            .collect()
            .await;

        let degraded = results.iter().filter(|r| r.is_degraded()).count();
        info!(
            "Batch complete: {} items, {} degraded",
            results.len(),
            degraded
        );
        results
    }
}

/// Stage boundary: a failure is logged, recorded, and replaced by the stage's
/// empty value (no keywords, empty description, score 0.0).
fn recover<T: Default, E: fmt::Display>(
    stage: Stage,
    title: &str,
    result: Result<T, E>,
    degradations: &mut Vec<Degradation>,
) -> T {
    result.unwrap_or_else(|e| {
        error!(stage = ?stage, title = %title, "Stage failed, using empty result: {e}");
        degradations.push(Degradation {
            stage,
            reason: e.to_string(),
        });
        T::default()
    })
}
