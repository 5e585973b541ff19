//! Fan-out dispatch of normalized items to subscribed services.
//!
//! Every (item, service) match becomes one delivery future. All of them are
//! joined inside the caller's task, and the report is built only once every
//! attempt has settled.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::{ServiceConfig, Transport};
use crate::error::DeliveryError;
use crate::event::{Entry, Item, OutboundEnvelope};
use crate::relay::deliver::Deliverer;
use crate::relay::filter::{matches, FieldTable};

/// Result of one (service, item) delivery attempt.
#[derive(Debug)]
pub enum DispatchOutcome {
    Delivered { service: String, response: Value },
    /// Failed on a test service; counts as success.
    Suppressed { service: String, error: DeliveryError },
    Failed { service: String, error: DeliveryError },
}

impl DispatchOutcome {
    pub fn service(&self) -> &str {
        match self {
            DispatchOutcome::Delivered { service, .. }
            | DispatchOutcome::Suppressed { service, .. }
            | DispatchOutcome::Failed { service, .. } => service,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Every outcome of one request's fan-out, in item × service order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DispatchOutcome::Delivered { .. }))
            .count()
    }

    pub fn suppressed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DispatchOutcome::Suppressed { .. }))
            .count()
    }

    /// First failure that was not suppressed, if any.
    pub fn first_failure(&self) -> Option<&DeliveryError> {
        self.outcomes.iter().find_map(|o| match o {
            DispatchOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }
}

/// Routes items to services over their configured transports.
pub struct Dispatcher {
    services: Vec<ServiceConfig>,
    fields: FieldTable,
    http: Arc<dyn Deliverer>,
    rpc: Arc<dyn Deliverer>,
}

impl Dispatcher {
    pub fn new(
        services: Vec<ServiceConfig>,
        fields: FieldTable,
        http: Arc<dyn Deliverer>,
        rpc: Arc<dyn Deliverer>,
    ) -> Self {
        Self {
            services,
            fields,
            http,
            rpc,
        }
    }

    pub fn services(&self) -> &[ServiceConfig] {
        &self.services
    }

    /// Deliver every item of `entries` to every service that wants it.
    pub async fn dispatch(&self, entries: &[Entry]) -> DispatchReport {
        let envelopes: Vec<(&Entry, &Item, OutboundEnvelope)> = entries
            .iter()
            .flat_map(|entry| {
                entry
                    .items
                    .iter()
                    .map(move |item| (entry, item, OutboundEnvelope::for_item(entry, item)))
            })
            .collect();

        let attempts = envelopes.iter().flat_map(|(entry, item, envelope)| {
            self.services
                .iter()
                .filter(move |service| matches(service, item, &self.fields))
                .map(move |service| self.attempt(service, entry, item, envelope))
        });

        let outcomes = join_all(attempts).await;
        let report = DispatchReport { outcomes };

        info!(
            items = envelopes.len(),
            attempted = report.attempted(),
            delivered = report.delivered(),
            suppressed = report.suppressed(),
            failed = report.outcomes.iter().filter(|o| o.is_failure()).count(),
            "dispatch_complete"
        );

        report
    }

    async fn attempt(
        &self,
        service: &ServiceConfig,
        entry: &Entry,
        item: &Item,
        envelope: &OutboundEnvelope,
    ) -> DispatchOutcome {
        let result = match &service.transport {
            Transport::Http { .. } => {
                self.http.deliver(service, &entry.account_id, envelope).await
            }
            Transport::Rpc { .. } => self.rpc.deliver(service, &entry.account_id, envelope).await,
            Transport::Unsupported(name) => Err(DeliveryError::UnsupportedTransport(name.clone())),
        };

        let name = service.name.clone();
        match result {
            Ok(response) => {
                info!(
                    service = %name,
                    transport = service.transport.name(),
                    account_id = %entry.account_id,
                    item = item.label(),
                    "delivery_succeeded"
                );
                DispatchOutcome::Delivered {
                    service: name,
                    response,
                }
            }
            Err(error) if service.test => {
                warn!(
                    service = %name,
                    transport = service.transport.name(),
                    account_id = %entry.account_id,
                    item = item.label(),
                    error = %error,
                    "delivery_suppressed"
                );
                DispatchOutcome::Suppressed {
                    service: name,
                    error,
                }
            }
            Err(error) => {
                error!(
                    service = %name,
                    transport = service.transport.name(),
                    account_id = %entry.account_id,
                    item = item.label(),
                    error = %error,
                    "delivery_failed"
                );
                DispatchOutcome::Failed {
                    service: name,
                    error,
                }
            }
        }
    }
}
