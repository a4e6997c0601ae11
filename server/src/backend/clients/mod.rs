//! # Clients Module
//!
//! Outbound collaborators the backend depends on but does not own:
//!
//! - **Text generation**: a prompt-in / text-out chat completion API
//! - **Payments**: hosted checkout, billing portal and session lookup
//!
//! The domain layer only sees the [`TextGenerator`] and [`PaymentGateway`]
//! traits, so tests can swap in canned implementations.

pub mod openai;
pub mod stripe;

use async_trait::async_trait;
use serde::Deserialize;

pub use openai::OpenAiClient;
pub use stripe::StripeClient;

/// Produces text from a system instruction and a user prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, TextGenerationError>;

    /// The configured API key, used only for masked diagnostics
    fn api_key(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TextGenerationError {
    #[error("OpenAI API key is not configured")]
    NotConfigured,
    #[error("OpenAI API key does not appear to be in the correct format")]
    InvalidKeyFormat,
    #[error("Error from OpenAI API: {message}")]
    Api { status: u16, message: String },
    #[error("Error from OpenAI API: {0}")]
    Transport(String),
    #[error("OpenAI API returned no text")]
    EmptyResponse,
}

/// Parameters for a hosted subscription checkout
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionParams {
    pub price_id: String,
    pub customer_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortalSession {
    pub url: String,
}

/// Checkout session retrieved with `customer` and `subscription` expanded
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpandedCheckoutSession {
    #[serde(default)]
    pub customer: serde_json::Value,
    #[serde(default)]
    pub subscription: serde_json::Value,
}

/// Hosted payment flows delegated to the payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentGatewayError>;

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<ExpandedCheckoutSession, PaymentGatewayError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("Stripe secret key is not configured")]
    NotConfigured,
    #[error("{message}")]
    Provider { status: u16, message: String },
    #[error("Failed to reach Stripe: {0}")]
    Transport(String),
    #[error("Unexpected response from Stripe: {0}")]
    InvalidResponse(String),
}
