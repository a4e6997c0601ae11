//! # Backend Module
//!
//! All non-UI logic for the note-writing service.
//!
//! ## Architecture
//!
//! ```text
//! Web UI
//!     ↓
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (note assembly, templates, billing)
//!     ↓                       ↓
//! Storage Layer (YAML)    Clients (OpenAI, Stripe)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Load configuration and wire services into [`AppState`]
//! - Set up the REST router with CORS and request tracing

pub mod clients;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::clients::{OpenAiClient, PaymentGateway, StripeClient, TextGenerator};
use crate::backend::config::AppConfig;
use crate::backend::domain::{BillingService, NoteService, TemplateService};
use crate::backend::storage::{TemplateRepository, TemplateStorage, YamlConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub note_service: NoteService,
    pub template_service: TemplateService,
    pub billing_service: BillingService,
    /// Redirect origin for requests without an Origin header
    pub default_origin: String,
}

/// Wire services around the given collaborators
pub fn build_app_state(
    text_generator: Arc<dyn TextGenerator>,
    payment_gateway: Arc<dyn PaymentGateway>,
    template_storage: Arc<dyn TemplateStorage>,
    config: &AppConfig,
) -> AppState {
    AppState {
        note_service: NoteService::new(text_generator),
        template_service: TemplateService::new(template_storage),
        billing_service: BillingService::new(payment_gateway, config.stripe.webhook_secret.clone()),
        default_origin: config.default_origin.clone(),
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up data directory: {:?}", config.data_dir);
    let connection = YamlConnection::new(&config.data_dir)?;
    let template_storage = Arc::new(TemplateRepository::new(connection));

    info!("Setting up outbound clients");
    if config.openai.api_key.is_none() {
        info!("OPENAI_API_KEY is not set; AI note generation will fail until it is");
    }
    if config.stripe.secret_key.is_none() {
        info!("STRIPE_SECRET_KEY is not set; billing routes will fail until it is");
    }
    let text_generator = Arc::new(OpenAiClient::new(&config.openai));
    let payment_gateway = Arc::new(StripeClient::new(&config.stripe));

    info!("Setting up application state");
    Ok(build_app_state(text_generator, payment_gateway, template_storage, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed origin: {}", config.allowed_origin))?;

    // CORS setup to allow the web UI to make requests
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .merge(io::rest::note_apis::router())
        .merge(io::rest::template_apis::router())
        .merge(io::rest::billing_apis::router())
        .merge(io::rest::diagnostics_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
