//! Narrative API - Rhetorical deconstruction of text through a hosted model.
//!
//! This crate provides the HTTP service:
//! - Three-stage analysis (assumptions, per-sentence bias and tactics, omissions)
//! - Demo mode with a canned result
//! - Optional bearer access key on the analysis route
//! - HTML rendering of results and an embedded browser interface
//!
//! ## Architecture
//!
//! ```text
//! Client → Router (CORS, trace, body limit) → auth gate → Analyzer → Provider
//!                                                            ↓
//!                                                     SynthesisResult
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod auth;
pub mod error;
pub mod provider;
pub mod render;
pub mod routes;

pub use analysis::{AnalysisError, Analyzer, SynthesisResult};
pub use error::{ApiError, ErrorResponse};
pub use provider::{AzureOpenAIProvider, ChatRequest, ChatResponse, Provider, ProviderError};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use narrative_common::config::Config;
use routes::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the router, constructing the analyzer from configuration.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let analyzer = Analyzer::from_config(config)?;
    Ok(build_router_with_analyzer(config, analyzer))
}

/// Build the router around an existing analyzer.
pub fn build_router_with_analyzer(config: &Config, analyzer: Analyzer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        analyzer: Arc::new(analyzer),
        config: Arc::new(config.clone()),
    };

    routes::build_routes(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server and run until interrupted.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = config.bind_address()?;

    let router = build_router(config)?;

    tracing::info!(
        demo_mode = config.demo_mode(),
        requires_api_key = config.requires_api_key(),
        "Starting Narrative API on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Narrative API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
