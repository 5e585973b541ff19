//! Delivery transports.
//!
//! Each transport implements [`Deliverer`]; the dispatcher picks one per
//! service from its configured transport.

pub mod http;
pub mod rpc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::DeliveryError;
use crate::event::OutboundEnvelope;

pub use http::HttpDeliverer;
pub use rpc::{JsonRpcClient, RpcDeliverer, RpcRegistry};

/// Sends one single-item envelope to one service.
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Deliver `envelope` on behalf of `account_id`, returning the remote response.
    async fn deliver(
        &self,
        service: &ServiceConfig,
        account_id: &str,
        envelope: &OutboundEnvelope,
    ) -> Result<Value, DeliveryError>;
}
