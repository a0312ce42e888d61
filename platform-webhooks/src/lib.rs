//! # platform-webhooks: webhook signatures for the platform SDK
//!
//! The platform signs every webhook delivery so that receivers can check the payload came from
//! the platform, was not altered in transit, and is not a replay of an old delivery.
//!
//! ## Protocol
//!
//! A delivery carries two headers next to its raw JSON body:
//!
//! ```text
//! X-Webhook-Signature: sha256=<lowercase hex HMAC-SHA256>
//! X-Webhook-Timestamp: <unix seconds>
//! ```
//!
//! The HMAC is keyed with the endpoint's shared secret and computed over
//! `"{timestamp}.{body}"`. A receiver rejects the request when the timestamp is more than the
//! tolerance window (300 seconds by default) away from its own clock, or when the recomputed
//! signature does not match in a constant-time comparison.
//!
//! ## Usage
//!
//! Sending side:
//!
//! ```
//! use platform_webhooks::webhooks::{SignedRequest, WebhookEventType, WebhookPayload};
//!
//! let payload = WebhookPayload::new(WebhookEventType::UserCreated, "tenant_1", serde_json::json!({"id": "usr_1"}));
//! let request = SignedRequest::from_payload(&payload, "whsec_...").unwrap();
//! // attach request.headers and send request.body unmodified
//! ```
//!
//! Receiving side, with axum:
//!
//! ```no_run
//! use axum::{Router, routing::post};
//! use platform_webhooks::webhooks::{VerifiedWebhook, WebhookVerifier};
//!
//! async fn handle(_webhook: VerifiedWebhook) -> &'static str {
//!     // _webhook.0 is the raw, verified body
//!     "ok"
//! }
//!
//! let app: Router = Router::new()
//!     .route("/webhooks", post(handle))
//!     .with_state(WebhookVerifier::new("whsec_..."));
//! ```
//!
//! Or directly:
//!
//! ```
//! use platform_webhooks::webhooks::{sign, verify, DEFAULT_TOLERANCE_SECS};
//!
//! let signed = sign(r#"{"event":"user.created"}"#, "whsec_test", None);
//! verify(r#"{"event":"user.created"}"#, &signed.signature, "whsec_test", signed.timestamp, DEFAULT_TOLERANCE_SECS).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod webhooks;

pub use config::Config;
pub use errors::{Error, Result, SignatureFailure};
