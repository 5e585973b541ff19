//! HTTP transport - JSON POST to the service URL.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use crate::config::{ServiceConfig, Transport};
use crate::error::DeliveryError;
use crate::event::OutboundEnvelope;

use super::Deliverer;

/// Posts envelopes as JSON bodies.
#[derive(Clone)]
pub struct HttpDeliverer {
    client: Client,
}

impl HttpDeliverer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Service URL with `token` appended as a query parameter when set.
pub fn target_url(url: &str, token: Option<&str>) -> Result<Url, DeliveryError> {
    let mut url = Url::parse(url)?;
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

#[async_trait]
impl Deliverer for HttpDeliverer {
    async fn deliver(
        &self,
        service: &ServiceConfig,
        account_id: &str,
        envelope: &OutboundEnvelope,
    ) -> Result<Value, DeliveryError> {
        let (url, token) = match &service.transport {
            Transport::Http { url, token } => (url, token),
            other => return Err(DeliveryError::UnsupportedTransport(other.name().to_string())),
        };
        let target = target_url(url, token.as_deref())?;

        let response = match self.client.post(target).json(envelope).send().await {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_timeout() {
                    error!(service = %service.name, error = %e, "http_delivery_timeout");
                } else {
                    error!(service = %service.name, error = %e, "http_delivery_request_error");
                }
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let response = response.error_for_status()?;
        let body = response.text().await?;

        info!(
            service = %service.name,
            account_id = account_id,
            status_code = status,
            body_length = body.len(),
            "http_delivery_complete"
        );

        Ok(serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body)))
    }
}
