//! # REST API for Template Management
//!
//! Endpoints for listing, creating, updating, duplicating and deleting
//! templates, plus the hand-off of a chosen template to the note form.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::backend::domain::commands::templates::{DuplicateTemplateCommand, ListTemplatesQuery};
use crate::backend::io::rest::errors::ApiError;
use crate::backend::io::rest::extractors::{Json, Path, Query};
use crate::backend::io::rest::mappers::template_mapper::TemplateMapper;
use crate::backend::domain::TemplateService;
use crate::backend::AppState;
use shared::{ConsumeSelectionRequest, DuplicateTemplateRequest, TemplateRequest};

#[derive(Debug, Default, Deserialize)]
pub struct TemplateSearchParams {
    pub search: Option<String>,
}

/// Create a router for template related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/templates/:id/duplicate", post(duplicate_template))
        .route("/templates/:id/apply", post(apply_template))
        .route("/template-selection/consume", post(consume_selection))
}

/// Template storage does blocking file I/O, so calls run on the blocking pool
async fn run_blocking<T, F>(state: &AppState, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&TemplateService) -> Result<T> + Send + 'static,
{
    let service = state.template_service.clone();
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| anyhow!("Template task join error: {}", e))?
}

/// List templates, optionally filtered by `?search=`
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateSearchParams>,
) -> impl IntoResponse {
    info!("GET /api/templates - search: {:?}", params.search);

    let query = ListTemplatesQuery { search: params.search };
    match run_blocking(&state, move |service| service.list_templates(query)).await {
        Ok(result) => (StatusCode::OK, Json(TemplateMapper::to_list_response(result))).into_response(),
        Err(e) => {
            error!("Failed to list templates: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/templates/{}", template_id);

    match run_blocking(&state, move |service| service.get_template(&template_id)).await {
        Ok(template) => (StatusCode::OK, Json(TemplateMapper::to_dto(template))).into_response(),
        Err(e) => {
            error!("Failed to get template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<TemplateRequest>,
) -> impl IntoResponse {
    info!("POST /api/templates - title: {}", request.title);

    let command = TemplateMapper::to_create_command(request);
    match run_blocking(&state, move |service| service.create_template(command)).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(TemplateMapper::to_template_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to create template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Json(request): Json<TemplateRequest>,
) -> impl IntoResponse {
    info!("PUT /api/templates/{}", template_id);

    let command = TemplateMapper::to_update_command(template_id, request);
    match run_blocking(&state, move |service| service.update_template(command)).await {
        Ok(result) => (StatusCode::OK, Json(TemplateMapper::to_template_response(result))).into_response(),
        Err(e) => {
            error!("Failed to update template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/templates/{}", template_id);

    match run_blocking(&state, move |service| service.delete_template(&template_id)).await {
        Ok(result) => (StatusCode::OK, Json(TemplateMapper::to_delete_response(result))).into_response(),
        Err(e) => {
            error!("Failed to delete template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Copy a template; the body may carry a new title
pub async fn duplicate_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    request: Option<Json<DuplicateTemplateRequest>>,
) -> impl IntoResponse {
    info!("POST /api/templates/{}/duplicate", template_id);

    let request = request.map(|Json(r)| r).unwrap_or_default();
    let command = DuplicateTemplateCommand {
        template_id,
        title: request.title,
    };
    match run_blocking(&state, move |service| service.duplicate_template(command)).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(TemplateMapper::to_template_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to duplicate template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Mark a template as the one the note form should load next
pub async fn apply_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/templates/{}/apply", template_id);

    match run_blocking(&state, move |service| service.apply_template(&template_id)).await {
        Ok(selection) => (StatusCode::OK, Json(TemplateMapper::to_apply_response(selection))).into_response(),
        Err(e) => {
            error!("Failed to apply template: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Lay the pending template over the posted form values, once
pub async fn consume_selection(
    State(state): State<AppState>,
    Json(request): Json<ConsumeSelectionRequest>,
) -> impl IntoResponse {
    info!("POST /api/template-selection/consume");

    let current = request.current;
    match run_blocking(&state, move |service| service.consume_selection(current)).await {
        Ok(result) => (StatusCode::OK, Json(TemplateMapper::to_consume_response(result))).into_response(),
        Err(e) => {
            error!("Failed to consume template selection: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
