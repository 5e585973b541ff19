//! Webhook endpoint handlers.
//!
//! The root handler runs every notification through:
//! 1. The subscription handshake, when `hub.mode=subscribe`
//! 2. The unsigned-request soft accept
//! 3. Signature verification over the raw body
//! 4. Normalization and fan-out
//!
//! The response is only written once every delivery has settled.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::RelayError;
use crate::event::normalize;
use crate::relay::Dispatcher;
use crate::web::handshake::{authorize, HubQuery};
use crate::web::signature::{is_signature_verification_enabled, verify_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Relay Webhook
// =============================================================================

/// Root endpoint for both handshakes and notifications, any method.
pub async fn relay_webhook(
    State(state): State<AppState>,
    query: Option<Query<HubQuery>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    // A query string that does not parse is not a handshake.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    if query.is_subscribe() {
        let challenge = authorize(&query, state.config.verify_token.as_deref())?;
        return Ok((StatusCode::OK, challenge).into_response());
    }

    // Unsigned requests get a neutral answer.
    let Some(signature) = headers.get(SIGNATURE_HEADER) else {
        info!(body_length = body.len(), "webhook_unsigned_request");
        return Ok((StatusCode::OK, "pong").into_response());
    };
    let signature = signature.to_str().unwrap_or_default();

    if let Some(secret) = state.config.app_secret.as_deref() {
        if is_signature_verification_enabled(&state.config.app_secret) {
            verify_signature(secret, &body, signature)?;
        }
    }

    info!(body_length = body.len(), "webhook_received");

    let entries = normalize(&body)?;
    let report = state.dispatcher.dispatch(&entries).await;

    if let Some(error) = report.first_failure() {
        warn!(
            attempted = report.attempted(),
            error = %error,
            "webhook_relay_failed"
        );
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response());
    }

    info!(
        attempted = report.attempted(),
        delivered = report.delivered(),
        "webhook_relayed"
    );

    Ok((StatusCode::OK, "OK").into_response())
}
