//! Inbound verification for webhook receivers.
//!
//! [`WebhookVerifier`] bundles the endpoint secret, the tolerance window and a
//! clock. [`VerifiedWebhook`] is an axum extractor that only yields the raw
//! body once both headers have been checked against it.

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, Request},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::config::SignatureConfig;
use crate::errors::{Error, Result};
use crate::webhooks::headers::{HEADER_SIGNATURE, HEADER_TIMESTAMP, parse_timestamp_header};
use crate::webhooks::signing::{self, Clock, DEFAULT_TOLERANCE_SECS, SystemClock};

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build a verifier from configuration; fails if no secret is configured.
    pub fn from_config(config: &SignatureConfig) -> Result<Self> {
        let secret = config.secret.clone().ok_or(Error::MissingSecret)?;
        Ok(Self::new(secret).with_tolerance(config.tolerance_secs))
    }

    pub fn with_tolerance(mut self, tolerance_secs: u64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn tolerance_secs(&self) -> u64 {
        self.tolerance_secs
    }

    pub fn verify(&self, payload: impl AsRef<[u8]>, signature: &str, timestamp: i64) -> Result<()> {
        signing::verify_at(
            self.clock.as_ref(),
            payload,
            signature,
            &self.secret,
            timestamp,
            self.tolerance_secs,
        )
    }

    /// Verify a raw body against the signature headers of the request it arrived with.
    pub fn verify_headers(&self, headers: &HeaderMap, body: impl AsRef<[u8]>) -> Result<()> {
        let signature = header_str(headers, HEADER_SIGNATURE)?;
        let timestamp = parse_timestamp_header(header_str(headers, HEADER_TIMESTAMP)?)?;

        match self.verify(body, signature, timestamp) {
            Ok(()) => {
                tracing::debug!(timestamp, "Webhook signature verified");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(timestamp, error = %e, "Webhook signature rejected");
                Err(e)
            }
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    let value = headers.get(name).ok_or_else(|| Error::MissingHeader {
        header: name.to_string(),
    })?;

    value.to_str().map_err(|e| Error::MalformedHeader {
        header: name.to_string(),
        message: e.to_string(),
    })
}

/// Raw request body whose webhook signature has been verified.
#[derive(Debug, Clone)]
pub struct VerifiedWebhook(pub Bytes);

impl VerifiedWebhook {
    /// Deserialize the verified body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.0)?)
    }

    pub fn into_inner(self) -> Bytes {
        self.0
    }
}

impl<S> FromRequest<S> for VerifiedWebhook
where
    S: Send + Sync,
    WebhookVerifier: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let verifier = WebhookVerifier::from_ref(state);
        let headers = req.headers().clone();

        // Buffer the body untouched; any decoding or re-serialization would change the signed bytes
        let body = Bytes::from_request(req, state).await.map_err(IntoResponse::into_response)?;

        verifier.verify_headers(&headers, &body).map_err(IntoResponse::into_response)?;

        Ok(Self(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SignatureFailure;
    use crate::webhooks::events::{WebhookEventType, WebhookPayload};
    use crate::webhooks::signing::{FixedClock, sign};
    use axum::{Router, http::HeaderValue, http::StatusCode, routing::post};
    use axum_test::TestServer;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_700_000_000;
    const BODY: &str = r#"{"event":"user.created"}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET).with_clock(FixedClock(NOW))
    }

    fn signed_headers(body: &str, timestamp: i64) -> HeaderMap {
        let result = sign(body, SECRET, Some(timestamp));
        let mut headers = HeaderMap::new();
        for (name, value) in result.headers() {
            headers.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(&value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn test_verify_headers_accepts_valid_request() {
        let headers = signed_headers(BODY, NOW - 10);
        assert!(verifier().verify_headers(&headers, BODY).is_ok());
    }

    #[test]
    fn test_verify_headers_accepts_bare_hex_signature() {
        let result = sign(BODY, SECRET, Some(NOW));
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_SIGNATURE,
            HeaderValue::from_str(result.signature.strip_prefix("sha256=").unwrap()).unwrap(),
        );
        headers.insert(HEADER_TIMESTAMP, HeaderValue::from(NOW));

        assert!(verifier().verify_headers(&headers, BODY).is_ok());
    }

    #[test]
    fn test_verify_headers_missing_headers() {
        let mut headers = signed_headers(BODY, NOW);
        headers.remove(HEADER_TIMESTAMP);
        match verifier().verify_headers(&headers, BODY) {
            Err(Error::MissingHeader { header }) => assert_eq!(header, HEADER_TIMESTAMP),
            other => panic!("expected missing timestamp header, got {:?}", other),
        }

        let mut headers = signed_headers(BODY, NOW);
        headers.remove(HEADER_SIGNATURE);
        match verifier().verify_headers(&headers, BODY) {
            Err(Error::MissingHeader { header }) => assert_eq!(header, HEADER_SIGNATURE),
            other => panic!("expected missing signature header, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_headers_malformed_timestamp() {
        let mut headers = signed_headers(BODY, NOW);
        headers.insert(HEADER_TIMESTAMP, HeaderValue::from_static("yesterday"));

        assert!(matches!(
            verifier().verify_headers(&headers, BODY),
            Err(Error::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_verify_headers_rejects_stale_and_tampered() {
        let headers = signed_headers(BODY, NOW - 301);
        assert!(matches!(
            verifier().verify_headers(&headers, BODY),
            Err(Error::InvalidSignature {
                reason: SignatureFailure::StaleTimestamp
            })
        ));

        let headers = signed_headers(BODY, NOW);
        assert!(matches!(
            verifier().verify_headers(&headers, r#"{"event":"user.deleted"}"#),
            Err(Error::InvalidSignature {
                reason: SignatureFailure::Mismatch
            })
        ));
    }

    #[test]
    fn test_with_tolerance() {
        let headers = signed_headers(BODY, NOW - 600);
        assert!(verifier().verify_headers(&headers, BODY).is_err());
        assert!(verifier().with_tolerance(600).verify_headers(&headers, BODY).is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = SignatureConfig {
            secret: Some(SECRET.to_string()),
            tolerance_secs: 60,
        };
        let verifier = WebhookVerifier::from_config(&config).unwrap();
        assert_eq!(verifier.tolerance_secs(), 60);

        let missing = SignatureConfig {
            secret: None,
            tolerance_secs: 60,
        };
        assert!(matches!(WebhookVerifier::from_config(&missing), Err(Error::MissingSecret)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("redacted"));
    }

    async fn receive(webhook: VerifiedWebhook) -> std::result::Result<String, Error> {
        let payload: WebhookPayload = webhook.json()?;
        Ok(payload.event.to_string())
    }

    async fn receive_raw(webhook: VerifiedWebhook) -> Bytes {
        webhook.into_inner()
    }

    fn test_server(verifier: WebhookVerifier) -> TestServer {
        let app = Router::new()
            .route("/webhooks", post(receive))
            .route("/webhooks/raw", post(receive_raw))
            .with_state(verifier);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_extractor_accepts_signed_delivery() {
        let server = test_server(WebhookVerifier::new(SECRET));
        let payload = WebhookPayload::new(WebhookEventType::RoleAssigned, "tenant_1", serde_json::json!({}));
        let request = crate::webhooks::delivery::SignedRequest::from_payload(&payload, SECRET).unwrap();

        let mut call = server.post("/webhooks");
        for (name, value) in &request.headers {
            call = call.add_header(name.as_str(), value.as_str());
        }
        let response = call.text(request.body.clone()).await;

        response.assert_status_ok();
        assert_eq!(response.text(), "role.assigned");
    }

    #[test_log::test(tokio::test)]
    async fn test_extractor_rejects_bad_signature() {
        let server = test_server(verifier());
        let result = sign(BODY, "whsec_wrong", Some(NOW));

        let response = server
            .post("/webhooks")
            .add_header(HEADER_SIGNATURE, result.signature.as_str())
            .add_header(HEADER_TIMESTAMP, NOW.to_string().as_str())
            .text(BODY)
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.text(), "Invalid webhook signature");
    }

    #[test_log::test(tokio::test)]
    async fn test_extractor_rejects_stale_with_same_message() {
        let server = test_server(verifier());
        let result = sign(BODY, SECRET, Some(NOW - 3600));

        let response = server
            .post("/webhooks")
            .add_header(HEADER_SIGNATURE, result.signature.as_str())
            .add_header(HEADER_TIMESTAMP, result.timestamp.to_string().as_str())
            .text(BODY)
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.text(), "Invalid webhook signature");
    }

    #[tokio::test]
    async fn test_extractor_verifies_non_utf8_body() {
        let server = test_server(verifier());
        let body: Vec<u8> = b"{\xff\xfe}".to_vec();
        let result = sign(&body, SECRET, Some(NOW));

        let response = server
            .post("/webhooks/raw")
            .add_header(HEADER_SIGNATURE, result.signature.as_str())
            .add_header(HEADER_TIMESTAMP, NOW.to_string().as_str())
            .bytes(Bytes::from(body.clone()))
            .await;

        response.assert_status_ok();
        assert_eq!(&response.as_bytes()[..], &body[..]);
    }

    #[tokio::test]
    async fn test_extractor_rejects_tampered_non_utf8_body() {
        let server = test_server(verifier());
        let result = sign(b"{\xff\xfe}", SECRET, Some(NOW));

        let response = server
            .post("/webhooks/raw")
            .add_header(HEADER_SIGNATURE, result.signature.as_str())
            .add_header(HEADER_TIMESTAMP, NOW.to_string().as_str())
            .bytes(Bytes::from_static(b"{\xff\xfd}"))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_extractor_missing_headers() {
        let server = test_server(verifier());

        let response = server.post("/webhooks").text(BODY).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Missing x-webhook-signature header");
    }
}
