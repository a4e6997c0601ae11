//! Billing pass-through: hosted checkout, billing portal, session lookup and
//! webhook intake. Subscription state is owned by the payment provider.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::clients::{
    CheckoutSession, CheckoutSessionParams, ExpandedCheckoutSession, PaymentGateway, PortalSession,
};
use crate::backend::domain::commands::billing::{CreateCheckoutCommand, CreatePortalSessionCommand};
use crate::backend::domain::webhook::{
    dispatch_event, parse_event, verify_signature, WebhookError, WebhookOutcome,
    DEFAULT_TOLERANCE_SECS,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),
    #[error("Invalid {0} parameter")]
    InvalidParameter(&'static str),
}

#[derive(Clone)]
pub struct BillingService {
    gateway: Arc<dyn PaymentGateway>,
    webhook_secret: Option<String>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Provider object ids are plain `prefix_abc123` tokens
fn is_valid_session_id(session_id: &str) -> bool {
    session_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl BillingService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, webhook_secret: Option<String>) -> Self {
        Self {
            gateway,
            webhook_secret,
        }
    }

    pub async fn create_subscription_checkout(
        &self,
        command: CreateCheckoutCommand,
    ) -> Result<CheckoutSession> {
        if is_blank(&command.price_id) {
            return Err(BillingError::MissingParameter("priceId").into());
        }
        let origin = command.origin.trim_end_matches('/');

        let params = CheckoutSessionParams {
            price_id: command.price_id.trim().to_string(),
            customer_id: command.customer_id.filter(|c| !is_blank(c)),
            success_url: format!(
                "{}/subscription/success?session_id={{CHECKOUT_SESSION_ID}}",
                origin
            ),
            cancel_url: format!("{}/subscription/canceled", origin),
        };

        let session = self.gateway.create_checkout_session(&params).await?;
        info!("Created checkout session: {}", session.id);
        Ok(session)
    }

    pub async fn create_portal_session(
        &self,
        command: CreatePortalSessionCommand,
    ) -> Result<PortalSession> {
        if is_blank(&command.customer_id) {
            return Err(BillingError::MissingParameter("customerId").into());
        }
        let return_url = format!("{}/dashboard", command.origin.trim_end_matches('/'));

        let session = self
            .gateway
            .create_portal_session(command.customer_id.trim(), &return_url)
            .await?;
        info!("Created billing portal session for {}", command.customer_id.trim());
        Ok(session)
    }

    pub async fn get_checkout_session(
        &self,
        session_id: Option<&str>,
    ) -> Result<ExpandedCheckoutSession> {
        let session_id = match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(BillingError::MissingParameter("session_id").into()),
        };
        if !is_valid_session_id(session_id) {
            return Err(BillingError::InvalidParameter("session_id").into());
        }

        let session = self.gateway.retrieve_checkout_session(session_id).await?;
        info!("Retrieved checkout session: {}", session_id);
        Ok(session)
    }

    /// Verify a webhook delivery and log what it reports
    pub fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookOutcome> {
        self.handle_webhook_at(payload, signature, Utc::now().timestamp())
    }

    pub(crate) fn handle_webhook_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookOutcome> {
        let secret = self
            .webhook_secret
            .as_deref()
            .filter(|s| !is_blank(s))
            .ok_or(WebhookError::NotConfigured)?;
        let signature = signature.ok_or(WebhookError::MissingSignature)?;

        if let Err(e) = verify_signature(payload, signature, secret, now, DEFAULT_TOLERANCE_SECS) {
            warn!("Webhook signature verification failed: {}", e);
            return Err(e.into());
        }

        let event = parse_event(payload)?;
        info!("Received webhook event {} ({})", event.id, event.event_type);
        Ok(dispatch_event(&event))
    }
}
