//! HubRelay - webhook relay for page subscription notifications.
//!
//! Receives notifications from the platform, authenticates them, and fans
//! every item out to the downstream services subscribed to it.
//!
//! ## Architecture
//!
//! ```text
//! Platform → handshake / signature → normalize → filter → Deliverer (http | rpc) → Services
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod relay;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{load_services, Config, ServiceConfig, Transport};
pub use error::{ConfigError, DeliveryError, RelayError};
pub use event::{normalize, Entry, Item, MessagingKind};
pub use relay::{Dispatcher, FieldTable, HttpDeliverer, RpcDeliverer, RpcRegistry};
pub use web::{router, AppState};
