//! Route definitions for the narrative API.
//!
//! Provides the analysis endpoint, result rendering, client configuration,
//! the health check and the browser interface.

use crate::analysis::{AnalysisRequest, Analyzer, SynthesisResult};
use crate::auth::{require_bearer, AuthGate};
use crate::error::ApiError;
use crate::render::render_result;
use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use narrative_common::config::Config;
use narrative_common::logging::generate_trace_id;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: Arc<Config>,
}

/// Client-facing configuration flags.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub use_dummy_data: bool,
    pub requires_api_key: bool,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub message: String,
}

/// Build the complete router.
pub fn build_routes(state: AppState) -> Router {
    let gate = AuthGate::from_config(&state.config);
    if gate.is_enabled() {
        tracing::info!("Access key protection enabled for analysis requests");
    }

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/v1/config", get(config_handler))
        .route(
            "/api/v1/synthesize",
            post(synthesize_handler)
                .layer(middleware::from_fn_with_state(gate, require_bearer)),
        )
        .route("/api/v1/render", post(render_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Run the three-stage analysis on the submitted text.
async fn synthesize_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<SynthesisResult>, ApiError> {
    let Json(request) = payload?;
    let text = request
        .text()
        .ok_or_else(|| ApiError::Validation("Text is required".into()))?;

    let trace_id = generate_trace_id();
    let span = tracing::info_span!("synthesize", trace_id = %trace_id);

    async {
        let started = Instant::now();
        match state.analyzer.synthesize(text).await {
            Ok(result) => {
                tracing::info!(
                    duration_ms = started.elapsed().as_millis() as u64,
                    sentences = result.synthesized_text.len(),
                    "Analysis succeeded"
                );
                Ok(Json(result))
            }
            Err(err) => {
                tracing::error!(
                    stage = err.stage().map(|s| s.name()).unwrap_or("none"),
                    error = %err,
                    "Analysis failed"
                );
                Err(ApiError::from(err))
            }
        }
    }
    .instrument(span)
    .await
}

/// Render a result as an HTML fragment.
async fn render_handler(
    payload: Result<Json<SynthesisResult>, JsonRejection>,
) -> Result<Html<String>, ApiError> {
    let Json(result) = payload?;
    Ok(Html(render_result(&result)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Service Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        use_dummy_data: state.config.demo_mode(),
        requires_api_key: state.config.requires_api_key(),
    })
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        service: "narrative-api".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        message: "Narrative deconstruction service is running".into(),
    })
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
