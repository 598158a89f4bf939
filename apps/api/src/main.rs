mod config;
mod embedding;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod providers;
mod routes;
mod screening;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::providers::HttpClientProvider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Model clients are built per screening run; a missing key surfaces there as 503.
    if config.llm.api_key.is_none() {
        warn!("No LLM API key configured; screening requests will fail until LLM_API_KEY is set");
    }
    info!(
        "LLM model: {}, embeddings: {} ({} dims), timeout: {:?}",
        config.llm.model, config.embedding.model, config.embedding.dimension, config.model_timeout
    );

    let state = AppState {
        clients: Arc::new(HttpClientProvider::from_config(config.clone())),
        settings: config.screening_settings(),
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
