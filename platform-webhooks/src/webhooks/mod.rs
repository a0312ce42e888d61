//! Webhook signature protocol.
//!
//! - [`signing`]: HMAC-SHA256 signature generation and verification
//! - [`headers`]: `X-Webhook-Signature` / `X-Webhook-Timestamp` wire format
//! - [`events`]: Event types and the standard payload envelope
//! - [`delivery`]: Outbound signed request builder
//! - [`receiver`]: Inbound verifier and axum extractor

pub mod delivery;
pub mod events;
pub mod headers;
pub mod receiver;
pub mod signing;

pub use delivery::SignedRequest;
pub use events::{DeliveryStatus, EventInfo, WebhookEventType, WebhookPayload, list_events};
pub use headers::{HEADER_SIGNATURE, HEADER_TIMESTAMP, parse_timestamp_header};
pub use receiver::{VerifiedWebhook, WebhookVerifier};
pub use signing::{
    Clock, DEFAULT_TOLERANCE_SECS, FixedClock, SIGNATURE_PREFIX, SignatureResult, SystemClock, parse_signature_header, sign,
    verify, verify_at,
};
