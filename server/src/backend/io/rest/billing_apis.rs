//! # REST API for Billing
//!
//! Thin pass-through to the payment provider: hosted checkout, billing
//! portal, checkout-session lookup and the webhook endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::backend::domain::commands::billing::{CreateCheckoutCommand, CreatePortalSessionCommand};
use crate::backend::io::rest::errors::ApiError;
use crate::backend::io::rest::extractors::{Json, Query};
use crate::backend::AppState;
use shared::{
    CheckoutSessionDetails, CreateCheckoutRequest, CreateCheckoutResponse,
    CreatePortalSessionRequest, PortalSessionResponse, WebhookAck,
};

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutSessionQuery {
    pub session_id: Option<String>,
}

/// Create a router for billing related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-subscription", post(create_subscription))
        .route("/create-checkout", post(create_subscription))
        .route("/create-portal-session", post(create_portal_session))
        .route("/get-checkout-session", get(get_checkout_session))
        .route("/webhooks", post(handle_webhook))
}

/// The site origin redirects should return to
fn request_origin(headers: &HeaderMap, default_origin: &str) -> String {
    headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
        .unwrap_or(default_origin)
        .to_string()
}

pub async fn create_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCheckoutRequest>,
) -> impl IntoResponse {
    info!("POST /api/create-subscription - price: {}", request.price_id);

    let command = CreateCheckoutCommand {
        price_id: request.price_id,
        customer_id: request.customer_id,
        origin: request_origin(&headers, &state.default_origin),
    };
    match state.billing_service.create_subscription_checkout(command).await {
        Ok(session) => {
            let response = CreateCheckoutResponse {
                session_id: session.id,
                url: session.url,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create checkout session: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_portal_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePortalSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/create-portal-session");

    let command = CreatePortalSessionCommand {
        customer_id: request.customer_id,
        origin: request_origin(&headers, &state.default_origin),
    };
    match state.billing_service.create_portal_session(command).await {
        Ok(session) => (StatusCode::OK, Json(PortalSessionResponse { url: session.url })).into_response(),
        Err(e) => {
            error!("Failed to create portal session: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_checkout_session(
    State(state): State<AppState>,
    Query(params): Query<CheckoutSessionQuery>,
) -> impl IntoResponse {
    info!("GET /api/get-checkout-session - session: {:?}", params.session_id);

    match state
        .billing_service
        .get_checkout_session(params.session_id.as_deref())
        .await
    {
        Ok(session) => {
            let response = CheckoutSessionDetails {
                customer: session.customer,
                subscription: session.subscription,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to retrieve checkout session: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Webhook deliveries must be verified against the raw body bytes
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    info!("POST /api/webhooks");

    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    match state.billing_service.handle_webhook(&body, signature) {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(e) => {
            error!("Webhook rejected: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
