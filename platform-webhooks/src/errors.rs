use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Why a signature check rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFailure {
    /// Timestamp is further from "now" than the tolerance window allows
    StaleTimestamp,
    /// Recomputed signature differs from the provided one
    Mismatch,
}

impl std::fmt::Display for SignatureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleTimestamp => write!(f, "Request timestamp is too old or in the future"),
            Self::Mismatch => write!(f, "Signature mismatch"),
        }
    }
}

#[derive(ThisError, Debug)]
pub enum Error {
    /// Signature verification rejected the request
    #[error("{reason}")]
    InvalidSignature { reason: SignatureFailure },

    /// No shared secret was available to sign or verify with
    #[error("Webhook secret is not configured")]
    MissingSecret,

    /// A required webhook header was absent from the request
    #[error("Missing {header} header")]
    MissingHeader { header: String },

    /// A webhook header was present but could not be parsed
    #[error("Malformed {header} header: {message}")]
    MalformedHeader { header: String, message: String },

    /// Payload (de)serialization failure
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidSignature { .. } => StatusCode::UNAUTHORIZED,
            Error::MissingHeader { .. } | Error::MalformedHeader { .. } => StatusCode::BAD_REQUEST,
            Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::MissingSecret | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a caller-safe message. Both signature failures share one message so a
    /// response never tells an attacker which check failed.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidSignature { .. } => "Invalid webhook signature".to_string(),
            Error::MissingHeader { .. } | Error::MalformedHeader { .. } => self.to_string(),
            Error::Serialization(_) => "Invalid webhook payload".to_string(),
            Error::MissingSecret | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::MissingSecret | Error::Other(_) => {
                tracing::error!("Webhook verification error: {:#}", self);
            }
            Error::InvalidSignature { .. } => {
                tracing::info!("Rejected webhook: {}", self);
            }
            Error::MissingHeader { .. } | Error::MalformedHeader { .. } | Error::Serialization(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for webhook operation results
pub type Result<T> = std::result::Result<T, Error>;
