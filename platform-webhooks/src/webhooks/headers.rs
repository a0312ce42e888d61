//! Wire headers carrying a webhook signature.

use crate::errors::{Error, Result};

pub const HEADER_SIGNATURE: &str = "x-webhook-signature";
pub const HEADER_TIMESTAMP: &str = "x-webhook-timestamp";
pub const HEADER_CONTENT_TYPE: &str = "content-type";

/// Parse an `X-Webhook-Timestamp` header value as Unix seconds.
pub fn parse_timestamp_header(value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|e| Error::MalformedHeader {
        header: HEADER_TIMESTAMP.to_string(),
        message: e.to_string(),
    })
}
