//! Stripe REST client for the hosted checkout and billing portal flows.
//!
//! Requests are form encoded, as the Stripe API expects, and authenticated
//! with the secret key as a bearer token.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::{
    CheckoutSession, CheckoutSessionParams, ExpandedCheckoutSession, PaymentGateway,
    PaymentGatewayError, PortalSession,
};
use crate::backend::config::StripeSettings;

pub const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

pub struct StripeClient {
    secret_key: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

impl StripeClient {
    pub fn new(settings: &StripeSettings) -> Self {
        Self {
            secret_key: settings.secret_key.clone(),
            api_base: settings.api_base.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn secret_key(&self) -> Result<&str, PaymentGatewayError> {
        match self.secret_key.as_deref().map(str::trim) {
            None | Some("") => Err(PaymentGatewayError::NotConfigured),
            Some(key) => Ok(key),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PaymentGatewayError> {
        let response = request
            .bearer_auth(self.secret_key()?)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = parse_error(status.as_u16(), &body);
            error!("Stripe API error ({}): {}", status, err);
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))
    }
}

/// Flatten checkout parameters into Stripe's bracketed form encoding
pub(crate) fn checkout_form_params(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("line_items[0][price]".to_string(), params.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
        (
            "subscription_data[metadata][createdFrom]".to_string(),
            "web_checkout".to_string(),
        ),
    ];

    // Without a customer, Stripe creates one during checkout
    if let Some(customer_id) = &params.customer_id {
        form.push(("customer".to_string(), customer_id.clone()));
    }

    form
}

pub(crate) fn parse_error(status: u16, body: &str) -> PaymentGatewayError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| "Something went wrong".to_string());

    PaymentGatewayError::Provider { status, message }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        debug!("Creating Stripe checkout session for price {}", params.price_id);
        let request = self
            .client
            .post(self.url("checkout/sessions"))
            .form(&checkout_form_params(params));
        self.send(request).await
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentGatewayError> {
        debug!("Creating Stripe billing portal session for {}", customer_id);
        let request = self
            .client
            .post(self.url("billing_portal/sessions"))
            .form(&[("customer", customer_id), ("return_url", return_url)]);
        self.send(request).await
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<ExpandedCheckoutSession, PaymentGatewayError> {
        debug!("Retrieving Stripe checkout session {}", session_id);
        let request = self
            .client
            .get(self.url(&format!("checkout/sessions/{}", session_id)))
            .query(&[("expand[]", "subscription"), ("expand[]", "customer")]);
        self.send(request).await
    }
}
