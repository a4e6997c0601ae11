//! Translation from domain failures to HTTP responses.
//!
//! Every failing route answers `{"error": {"message": "..."}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorBody, ErrorDetail};

use crate::backend::clients::{PaymentGatewayError, TextGenerationError};
use crate::backend::domain::models::note::NoteValidationError;
use crate::backend::domain::models::template::TemplateError;
use crate::backend::domain::webhook::WebhookError;
use crate::backend::domain::BillingError;

const GENERIC_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<NoteValidationError>() {
            return Self::bad_request(e.to_string());
        }
        if let Some(e) = err.downcast_ref::<TemplateError>() {
            let status = match e {
                TemplateError::NotFound(_) => StatusCode::NOT_FOUND,
                TemplateError::TitleRequired => StatusCode::BAD_REQUEST,
            };
            return Self::new(status, e.to_string());
        }
        if let Some(e) = err.downcast_ref::<BillingError>() {
            return Self::bad_request(e.to_string());
        }
        if let Some(e) = err.downcast_ref::<WebhookError>() {
            let status = match e {
                WebhookError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            return Self::new(status, format!("Webhook Error: {}", e));
        }
        if let Some(e) = err.downcast_ref::<TextGenerationError>() {
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        if let Some(e) = err.downcast_ref::<PaymentGatewayError>() {
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE)
    }
}

// Malformed requests are client errors whatever axum's own status would be
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
