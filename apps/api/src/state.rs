use std::sync::Arc;

use crate::config::Config;
use crate::seo::pipeline::SeoPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one pipeline (and oracle handle) for the whole process.
    pub pipeline: Arc<SeoPipeline>,
    pub config: Config,
}
