//! # REST API for Diagnostics
//!
//! Operator checks for the text-generation key and a liveness probe.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::backend::AppState;
use shared::HealthResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-key", get(test_key))
        .route("/debug-openai", get(debug_openai))
        .route("/health", get(health))
}

/// Whether a key is configured; never echoes the key itself
pub async fn test_key(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/test-key");
    (StatusCode::OK, Json(state.note_service.api_key_status()))
}

/// Live round trip to the text-generation service. Always 200; the body
/// reports success or the failure text.
pub async fn debug_openai(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/debug-openai");
    (StatusCode::OK, Json(state.note_service.check_text_generation().await))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok".to_string() }))
}
