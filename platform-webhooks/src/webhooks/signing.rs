//! HMAC-SHA256 signing for platform webhook deliveries.
//!
//! The platform signature scheme:
//! - Signature is computed over: `{timestamp}.{payload}`
//! - The signature is lowercase hex-encoded HMAC-SHA256, keyed by the endpoint secret
//! - The header value carries a `sha256=` scheme tag in front of the hex digest
//!
//! Receivers bound the age of a request with a tolerance window around the
//! signed timestamp, so a captured delivery cannot be replayed indefinitely.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::{Error, Result, SignatureFailure};
use crate::webhooks::headers::{HEADER_SIGNATURE, HEADER_TIMESTAMP};

type HmacSha256 = Hmac<Sha256>;

/// Scheme tag that prefixes every signature on the wire
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Default replay window for [`verify`], in seconds
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Source of "now" for freshness checks.
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the Unix epoch.
    fn now_unix(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// A generated signature and the timestamp it was bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureResult {
    /// `sha256=` followed by 64 lowercase hex characters
    pub signature: String,
    /// Unix seconds the signature was generated for
    pub timestamp: i64,
}

impl fmt::Display for SignatureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={})", self.signature, self.timestamp)
    }
}

impl SignatureResult {
    /// Header pairs to attach to an outbound delivery.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            (HEADER_SIGNATURE.to_string(), self.signature.clone()),
            (HEADER_TIMESTAMP.to_string(), self.timestamp.to_string()),
        ]
    }
}

/// Build the exact bytes fed into the HMAC: `{timestamp}.{payload}`.
pub fn signed_payload(timestamp: i64, payload: impl AsRef<[u8]>) -> Vec<u8> {
    let payload = payload.as_ref();
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.reserve(payload.len());
    signed.extend_from_slice(payload);
    signed
}

fn compute_signature(timestamp: i64, payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    // Fed in two parts so large bodies are not copied
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    let digest = mac.finalize().into_bytes();

    format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest))
}

/// Sign a webhook payload.
///
/// # Arguments
///
/// * `payload` - The serialized request body, exactly as it will be sent (text or raw bytes)
/// * `secret` - The endpoint's shared secret
/// * `timestamp` - Unix seconds to bind the signature to; defaults to now
///
/// # Returns
///
/// The `sha256=`-prefixed signature together with the timestamp that was signed.
pub fn sign(payload: impl AsRef<[u8]>, secret: &str, timestamp: Option<i64>) -> SignatureResult {
    if secret.is_empty() {
        tracing::warn!("Signing webhook payload with an empty secret");
    }

    let timestamp = timestamp.unwrap_or_else(|| SystemClock.now_unix());

    SignatureResult {
        signature: compute_signature(timestamp, payload.as_ref(), secret),
        timestamp,
    }
}

/// Verify a webhook signature against the system clock.
///
/// # Arguments
///
/// * `payload` - The raw request body, byte-for-byte as received
/// * `signature` - The `X-Webhook-Signature` header value (bare hex is accepted too)
/// * `secret` - The endpoint's shared secret
/// * `timestamp` - The `X-Webhook-Timestamp` header value
/// * `tolerance_secs` - Maximum allowed distance between `timestamp` and now
///
/// # Errors
///
/// [`Error::InvalidSignature`] when the timestamp is outside the tolerance window or the
/// signature does not match, [`Error::MissingSecret`] when `secret` is empty.
pub fn verify(
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: &str,
    timestamp: i64,
    tolerance_secs: u64,
) -> Result<()> {
    verify_at(&SystemClock, payload, signature, secret, timestamp, tolerance_secs)
}

/// [`verify`] with an explicit reference clock.
pub fn verify_at(
    clock: &dyn Clock,
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: &str,
    timestamp: i64,
    tolerance_secs: u64,
) -> Result<()> {
    if secret.is_empty() {
        return Err(Error::MissingSecret);
    }

    // Rejects both replays of old deliveries and timestamps from the future
    let now = clock.now_unix();
    if now.abs_diff(timestamp) > tolerance_secs {
        return Err(Error::InvalidSignature {
            reason: SignatureFailure::StaleTimestamp,
        });
    }

    let expected = compute_signature(timestamp, payload.as_ref(), secret);
    let provided = parse_signature_header(signature);

    if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        return Err(Error::InvalidSignature {
            reason: SignatureFailure::Mismatch,
        });
    }

    Ok(())
}

/// Normalize an `X-Webhook-Signature` header value to carry the `sha256=` prefix.
pub fn parse_signature_header(header: &str) -> String {
    if header.starts_with(SIGNATURE_PREFIX) {
        header.to_string()
    } else {
        format!("{}{}", SIGNATURE_PREFIX, header)
    }
}

/// Constant-time byte comparison to prevent timing attacks.
///
/// Only a length difference short-circuits; lengths are not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}
