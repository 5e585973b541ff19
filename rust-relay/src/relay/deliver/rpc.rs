//! RPC transport - JSON-RPC 2.0 method calls over HTTP.
//!
//! One client is registered per rpc service at startup, keyed by service name.
//! The registry is read-only afterwards and shared by every request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use crate::config::{ServiceConfig, Transport};
use crate::error::DeliveryError;
use crate::event::OutboundEnvelope;

use super::Deliverer;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client bound to one endpoint.
pub struct JsonRpcClient {
    client: Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Invoke `method` with positional `params` and return its result.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, DeliveryError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: JsonRpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.result, response.error) {
            (_, Some(err)) => Err(DeliveryError::Rpc {
                code: err.code,
                message: err.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(DeliveryError::RpcEmptyResponse),
        }
    }
}

/// RPC clients keyed by service name.
#[derive(Default)]
pub struct RpcRegistry {
    clients: HashMap<String, Arc<JsonRpcClient>>,
}

impl RpcRegistry {
    /// Build a client for every rpc service. Services whose endpoint does not
    /// parse are left out and fail at delivery time.
    pub fn connect(services: &[ServiceConfig], client: &Client) -> Self {
        let mut clients = HashMap::new();

        for service in services {
            let Transport::Rpc { endpoint, .. } = &service.transport else {
                continue;
            };

            match Url::parse(endpoint) {
                Ok(url) => {
                    info!(service = %service.name, endpoint = %url, "rpc_client_registered");
                    clients.insert(
                        service.name.clone(),
                        Arc::new(JsonRpcClient::new(client.clone(), url)),
                    );
                }
                Err(e) => {
                    warn!(service = %service.name, endpoint = %endpoint, error = %e, "rpc_client_invalid_endpoint");
                }
            }
        }

        Self { clients }
    }

    pub fn get(&self, service: &str) -> Option<&Arc<JsonRpcClient>> {
        self.clients.get(service)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Delivers envelopes by calling the service's configured method.
#[derive(Clone)]
pub struct RpcDeliverer {
    registry: Arc<RpcRegistry>,
}

impl RpcDeliverer {
    pub fn new(registry: Arc<RpcRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Deliverer for RpcDeliverer {
    async fn deliver(
        &self,
        service: &ServiceConfig,
        account_id: &str,
        envelope: &OutboundEnvelope,
    ) -> Result<Value, DeliveryError> {
        let (method, token) = match &service.transport {
            Transport::Rpc { method, token, .. } => (method, token),
            other => return Err(DeliveryError::UnsupportedTransport(other.name().to_string())),
        };

        let client = self
            .registry
            .get(&service.name)
            .ok_or_else(|| DeliveryError::RpcClientMissing(service.name.clone()))?;

        let argument = json!({
            "token": token,
            "accountId": account_id,
            "data": envelope,
        });

        let result = client.call(method, json!([argument])).await?;

        info!(
            service = %service.name,
            account_id = account_id,
            method = %method,
            "rpc_delivery_complete"
        );

        Ok(result)
    }
}
