//! Subscription handshake.
//!
//! When a subscription is created the platform calls the endpoint with
//! `hub.mode=subscribe`, our verify token and a challenge. Echoing the
//! challenge proves we own the endpoint.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::RelayError;

/// `hub.*` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HubQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl HubQuery {
    pub fn is_subscribe(&self) -> bool {
        self.mode.as_deref() == Some("subscribe")
    }
}

/// Answer a subscribe handshake, returning the challenge to echo.
pub fn authorize(query: &HubQuery, expected_token: Option<&str>) -> Result<String, RelayError> {
    match (query.verify_token.as_deref(), expected_token) {
        (Some(provided), Some(expected)) if provided == expected => {
            info!("handshake_authorized");
            Ok(query.challenge.clone().unwrap_or_default())
        }
        (_, None) => {
            warn!("handshake_verify_token_not_configured");
            Err(RelayError::InvalidVerifyToken)
        }
        (provided, Some(_)) => {
            warn!(has_token = provided.is_some(), "handshake_invalid_token");
            Err(RelayError::InvalidVerifyToken)
        }
    }
}
