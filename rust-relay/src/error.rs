//! Error types for the relay.
//!
//! Request-level errors stop a notification before any fanout and map to
//! HTTP responses. Delivery errors belong to a single (service, item) attempt.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that reject an inbound request before dispatch begins.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Handshake carried a verify token that does not match ours.
    #[error("Invalid token")]
    InvalidVerifyToken,

    /// `x-hub-signature` did not match the HMAC of the raw body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not a well-formed notification envelope.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Envelope `object` is something other than `page`.
    #[error("Unsupported object type: {0}")]
    UnsupportedObject(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport not supported: {0}")]
    UnsupportedTransport(String),

    #[error("no rpc client registered for service {0}")]
    RpcClientMissing(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("rpc response carried neither result nor error")]
    RpcEmptyResponse,

    #[error("http delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Problems found while loading the services file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read services file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse services file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service {service}: missing required setting `{setting}`")]
    MissingSetting {
        service: String,
        setting: &'static str,
    },
}
