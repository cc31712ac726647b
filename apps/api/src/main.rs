mod config;
mod errors;
mod models;
mod oracle;
mod routes;
mod seo;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::oracle::http::HttpOracle;
use crate::oracle::GuardedOracle;
use crate::routes::build_router;
use crate::seo::pipeline::SeoPipeline;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (unreadable or invalid config is fatal)
    let config = Config::load()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seogen v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generation oracle
    let http = HttpOracle::new(&config)?;
    if config.oracle.warmup {
        http.warm_up()
            .await
            .with_context(|| format!("failed to load model '{}'", config.model_name))?;
    }
    info!(
        "Oracle ready (model: {}, window: {}, timeout: {:?}, retries: {}, concurrency: {})",
        config.model_name,
        config.max_input_length,
        config.oracle.timeout,
        config.oracle.retries,
        config.oracle.concurrency
    );
    let oracle = GuardedOracle::from_config(Arc::new(http), &config.oracle);

    // Build app state
    let pipeline = SeoPipeline::new(Arc::new(oracle), config.batch_size);
    info!("SEO pipeline ready (batch concurrency: {})", pipeline.batch_size());
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
