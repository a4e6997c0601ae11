//! Stripe webhook verification and event dispatch.
//!
//! The `Stripe-Signature` header has the form `t=<unix>,v1=<hex>[,v1=<hex>]`.
//! Each `v1` value is an HMAC-SHA256 of `"<t>.<raw body>"` keyed with the
//! endpoint secret. Events are only logged; subscription state stays with
//! the provider.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::info;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook secret is not configured")]
    NotConfigured,
    #[error("Missing Stripe-Signature header")]
    MissingSignature,
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,
    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Hex-encoded HMAC-SHA256 over `"{timestamp}.{payload}"`
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let digest = signing_mac(secret, timestamp, payload).finalize().into_bytes();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn signing_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| value.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            // Unknown schemes (v0, future versions) are ignored
            "v1" => {
                if let Some(bytes) = decode_hex(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader { timestamp, signatures }),
        _ => Err(WebhookError::MalformedHeader),
    }
}

/// Verify a webhook payload against its signature header.
///
/// `now` is the current unix time in seconds.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    if header.trim().is_empty() {
        return Err(WebhookError::MissingSignature);
    }
    let parsed = parse_header(header)?;

    let mac = signing_mac(secret, parsed.timestamp, payload);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

pub fn parse_event(payload: &[u8]) -> Result<StripeEvent, WebhookError> {
    serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

/// What a webhook event meant, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    CheckoutCompleted {
        session_id: String,
        subscription_id: Option<String>,
    },
    SubscriptionCreated {
        subscription_id: String,
    },
    SubscriptionUpdated {
        subscription_id: String,
        status: String,
    },
    SubscriptionDeleted {
        subscription_id: String,
    },
    InvoicePaid {
        invoice_id: String,
        subscription_id: Option<String>,
    },
    Unhandled {
        event_type: String,
    },
}

fn string_field(object: &serde_json::Value, field: &str) -> Option<String> {
    match &object[field] {
        serde_json::Value::String(s) => Some(s.clone()),
        // Expanded objects carry their id inside
        serde_json::Value::Object(inner) => inner.get("id").and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

/// Classify an event and log it
pub fn dispatch_event(event: &StripeEvent) -> WebhookOutcome {
    let object = &event.data.object;
    let object_id = string_field(object, "id").unwrap_or_default();

    let outcome = match event.event_type.as_str() {
        "checkout.session.completed" => {
            let subscription_id = if object["mode"] == "subscription" {
                string_field(object, "subscription")
            } else {
                None
            };
            WebhookOutcome::CheckoutCompleted {
                session_id: object_id,
                subscription_id,
            }
        }
        "customer.subscription.created" => WebhookOutcome::SubscriptionCreated {
            subscription_id: object_id,
        },
        "customer.subscription.updated" => WebhookOutcome::SubscriptionUpdated {
            subscription_id: object_id,
            status: string_field(object, "status").unwrap_or_default(),
        },
        "customer.subscription.deleted" => WebhookOutcome::SubscriptionDeleted {
            subscription_id: object_id,
        },
        "invoice.paid" => WebhookOutcome::InvoicePaid {
            invoice_id: object_id,
            subscription_id: string_field(object, "subscription"),
        },
        other => WebhookOutcome::Unhandled {
            event_type: other.to_string(),
        },
    };

    match &outcome {
        WebhookOutcome::CheckoutCompleted { session_id, subscription_id } => {
            info!("Checkout session completed: {}", session_id);
            if let Some(subscription_id) = subscription_id {
                info!("Subscription created from checkout: {}", subscription_id);
            }
        }
        WebhookOutcome::SubscriptionCreated { subscription_id } => {
            info!("New subscription created: {}", subscription_id);
        }
        WebhookOutcome::SubscriptionUpdated { subscription_id, status } => {
            info!("Subscription updated: {}, status: {}", subscription_id, status);
        }
        WebhookOutcome::SubscriptionDeleted { subscription_id } => {
            info!("Subscription canceled: {}", subscription_id);
        }
        WebhookOutcome::InvoicePaid { invoice_id, subscription_id } => {
            info!(
                "Invoice paid: {} for subscription: {}",
                invoice_id,
                subscription_id.as_deref().unwrap_or("none")
            );
        }
        WebhookOutcome::Unhandled { event_type } => {
            info!("Unhandled event type: {}", event_type);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn signed_header(payload: &[u8], timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, compute_signature(SECRET, timestamp, payload))
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = signed_header(payload, NOW);
        assert_eq!(verify_signature(payload, &header, SECRET, NOW, DEFAULT_TOLERANCE_SECS), Ok(()));
    }

    #[test]
    fn test_any_matching_v1_signature_is_enough() {
        let payload = br#"{"id":"evt_1"}"#;
        let good = compute_signature(SECRET, NOW, payload);
        let header = format!("t={},v1={},v1={},v0=abc", NOW, "00".repeat(32), good);
        assert_eq!(verify_signature(payload, &header, SECRET, NOW, DEFAULT_TOLERANCE_SECS), Ok(()));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = signed_header(br#"{"id":"evt_1"}"#, NOW);
        assert_eq!(
            verify_signature(br#"{"id":"evt_2"}"#, &header, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let payload = b"{}";
        let header = signed_header(payload, NOW);
        assert_eq!(
            verify_signature(payload, &header, "whsec_other", NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let payload = b"{}";
        let header = signed_header(payload, NOW - 301);
        assert_eq!(
            verify_signature(payload, &header, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            verify_signature(b"{}", "", SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::MissingSignature)
        );
        assert_eq!(
            verify_signature(b"{}", "v1=abcd", SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(b"{}", "t=123,v1=zz", SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::MalformedHeader)
        );
    }

    #[test]
    fn test_hex_decoding() {
        assert_eq!(decode_hex("00ff10"), Some(vec![0x00, 0xff, 0x10]));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex("gg"), None);
    }

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        StripeEvent {
            id: "evt_1".to_string(),
            event_type: event_type.to_string(),
            data: EventData { object },
        }
    }

    #[test]
    fn test_dispatch_checkout_completed() {
        let outcome = dispatch_event(&event(
            "checkout.session.completed",
            json!({"id": "cs_1", "mode": "subscription", "subscription": "sub_1"}),
        ));
        assert_eq!(
            outcome,
            WebhookOutcome::CheckoutCompleted {
                session_id: "cs_1".to_string(),
                subscription_id: Some("sub_1".to_string()),
            }
        );

        let outcome = dispatch_event(&event(
            "checkout.session.completed",
            json!({"id": "cs_2", "mode": "payment", "subscription": null}),
        ));
        assert_eq!(
            outcome,
            WebhookOutcome::CheckoutCompleted { session_id: "cs_2".to_string(), subscription_id: None }
        );
    }

    #[test]
    fn test_dispatch_subscription_events() {
        let outcome = dispatch_event(&event(
            "customer.subscription.updated",
            json!({"id": "sub_1", "status": "past_due"}),
        ));
        assert_eq!(
            outcome,
            WebhookOutcome::SubscriptionUpdated {
                subscription_id: "sub_1".to_string(),
                status: "past_due".to_string(),
            }
        );

        let outcome = dispatch_event(&event("customer.subscription.deleted", json!({"id": "sub_1"})));
        assert_eq!(outcome, WebhookOutcome::SubscriptionDeleted { subscription_id: "sub_1".to_string() });
    }

    #[test]
    fn test_dispatch_invoice_with_expanded_subscription() {
        let outcome = dispatch_event(&event(
            "invoice.paid",
            json!({"id": "in_1", "subscription": {"id": "sub_9", "object": "subscription"}}),
        ));
        assert_eq!(
            outcome,
            WebhookOutcome::InvoicePaid {
                invoice_id: "in_1".to_string(),
                subscription_id: Some("sub_9".to_string()),
            }
        );
    }

    #[test]
    fn test_dispatch_unknown_event() {
        let outcome = dispatch_event(&event("payment_intent.created", json!({"id": "pi_1"})));
        assert_eq!(
            outcome,
            WebhookOutcome::Unhandled { event_type: "payment_intent.created".to_string() }
        );
    }

    #[test]
    fn test_parse_event() {
        let payload = br#"{"id":"evt_1","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;
        let event = parse_event(payload).expect("valid event");
        assert_eq!(event.event_type, "invoice.paid");
        assert_eq!(event.data.object["id"], "in_1");

        assert!(matches!(parse_event(b"not json"), Err(WebhookError::InvalidPayload(_))));
    }
}
