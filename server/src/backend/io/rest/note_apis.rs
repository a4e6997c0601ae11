//! # REST API for Notes
//!
//! Note generation, the free-form assistant prompt, section extraction and
//! the option catalogues the note form is built from.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::{error, info};

use crate::backend::io::rest::errors::ApiError;
use crate::backend::io::rest::extractors::Json;
use crate::backend::AppState;
use shared::{AskRequest, AskResponse, GenerateNoteRequest, NoteBodyResponse, NoteTextRequest};

/// Create a router for note related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notes/generate", post(generate_note))
        .route("/notes/sections", post(note_sections))
        .route("/notes/body", post(note_body))
        .route("/note-options", get(note_options))
        .route("/ask", post(ask))
}

/// Generate a note from the form values
pub async fn generate_note(
    State(state): State<AppState>,
    Json(request): Json<GenerateNoteRequest>,
) -> impl IntoResponse {
    info!("POST /api/notes/generate - mode: {:?}", request.mode);

    match state.note_service.generate_note(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to generate note: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Forward a free-form message to the text generator
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    info!("POST /api/ask");

    match state.note_service.ask(&request.message).await {
        Ok(reply) => (StatusCode::OK, Json(AskResponse { reply })).into_response(),
        Err(e) => {
            error!("Failed to answer message: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Split a note into labelled sections
pub async fn note_sections(
    State(state): State<AppState>,
    Json(request): Json<NoteTextRequest>,
) -> impl IntoResponse {
    info!("POST /api/notes/sections");
    (StatusCode::OK, Json(state.note_service.note_sections(&request.note)))
}

/// Text to copy to the clipboard
pub async fn note_body(
    State(state): State<AppState>,
    Json(request): Json<NoteTextRequest>,
) -> impl IntoResponse {
    info!("POST /api/notes/body");
    let body = state.note_service.note_body(&request.note);
    (StatusCode::OK, Json(NoteBodyResponse { body }))
}

pub async fn note_options(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/note-options");
    (StatusCode::OK, Json(state.note_service.note_options()))
}
