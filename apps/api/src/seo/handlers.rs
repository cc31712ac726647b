//! Axum route handlers for the SEO API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::item::ItemFeatures;
use crate::models::seo::{KeywordSet, SeoMetadata, SeoResult};
use crate::seo::metadata::optimize_metadata;
use crate::state::AppState;

/// A batch may hold this many multiples of the configured batch size.
const MAX_BATCH_MULTIPLE: usize = 16;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<ItemFeatures>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<SeoResult>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub description: String,
    #[serde(default)]
    pub keywords: KeywordSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/seo/generate
///
/// Runs the full pipeline for one item. Oracle failures degrade the result
/// (see `degradations`) but never fail the request.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(item): Json<ItemFeatures>,
) -> Result<Json<SeoResult>, AppError> {
    validate_item(&item)?;
    Ok(Json(state.pipeline.run(&item).await))
}

/// POST /api/v1/seo/batch
///
/// Runs the pipeline for every item; results come back in request order.
/// Items are not validated one by one: a blank title still gets a result,
/// so one bad row never costs the rest of the batch.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    if request.items.is_empty() {
        return Err(AppError::Validation("items cannot be empty".to_string()));
    }

    let max = state.config.batch_size * MAX_BATCH_MULTIPLE;
    if request.items.len() > max {
        return Err(AppError::BatchTooLarge {
            got: request.items.len(),
            max,
        });
    }

    let results = state.pipeline.run_batch(&request.items).await;
    Ok(Json(BatchResponse { results }))
}

/// POST /api/v1/seo/score
///
/// Assembles metadata for an existing description and keyword set without
/// calling the oracle. Used to re-score edited copy.
pub async fn handle_score(Json(request): Json<ScoreRequest>) -> Json<SeoMetadata> {
    Json(optimize_metadata(&request.description, &request.keywords))
}

fn validate_item(item: &ItemFeatures) -> Result<(), AppError> {
    if item.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    Ok(())
}
