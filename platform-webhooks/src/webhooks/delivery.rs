//! Outbound deliveries: serialize once, sign, attach headers.
//!
//! ```text
//! WebhookPayload
//!   ├─ to_json()          // the only serialization; these bytes are signed and sent
//!   ├─ signing::sign()    // HMAC-SHA256 over "{timestamp}.{body}"
//!   └─ SignedRequest { headers, body }
//!         └─ handed to whatever HTTP client the caller uses
//! ```
//!
//! Nothing here touches the network. The body must be sent unmodified or
//! the receiver's signature check will fail.

use crate::errors::Result;
use crate::webhooks::events::WebhookPayload;
use crate::webhooks::headers::HEADER_CONTENT_TYPE;
use crate::webhooks::signing::{self, SignatureResult};

/// A signed webhook body ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub signature: SignatureResult,
}

impl SignedRequest {
    /// Sign an already-serialized body.
    pub fn from_body(body: impl Into<String>, secret: &str, timestamp: Option<i64>) -> Self {
        let body = body.into();
        let signature = signing::sign(&body, secret, timestamp);

        let mut headers = vec![(HEADER_CONTENT_TYPE.to_string(), "application/json".to_string())];
        headers.extend(signature.headers());

        tracing::debug!(timestamp = signature.timestamp, body_len = body.len(), "Signed webhook body");

        Self { headers, body, signature }
    }

    /// Serialize a payload and sign it at the current time.
    pub fn from_payload(payload: &WebhookPayload, secret: &str) -> Result<Self> {
        let body = payload.to_json()?;
        Ok(Self::from_body(body, secret, None))
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
