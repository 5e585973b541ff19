//! Configuration module.
//!
//! Process settings come from environment variables. The downstream services
//! come from a JSON file whose path is itself an environment variable.

use std::collections::BTreeMap;
use std::env;
use std::fs;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for `x-hub-signature` HMAC verification
    pub app_secret: Option<String>,

    /// Token expected in `hub.verify_token` during the subscription handshake
    pub verify_token: Option<String>,

    /// Path of the JSON file describing downstream services
    pub services_file: String,

    /// Timeout applied to every outbound delivery, in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_or("PORT", 8080),

            app_secret: non_empty("APP_SECRET"),

            verify_token: non_empty("VERIFY_TOKEN"),

            services_file: env::var("SERVICES_FILE")
                .unwrap_or_else(|_| "services.json".to_string()),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 10_000),
        }
    }
}

/// Parse a numeric environment variable, falling back to `default`.
fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = name, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read an environment variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Downstream services
// =============================================================================

/// How a service receives its notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC method call on the client registered under the service name
    Rpc {
        endpoint: String,
        method: String,
        token: Option<String>,
    },
    /// Plain JSON POST
    Http { url: String, token: Option<String> },
    /// Transport name we do not know how to speak; fails at dispatch time
    Unsupported(String),
}

impl Transport {
    pub fn name(&self) -> &str {
        match self {
            Transport::Rpc { .. } => "rpc",
            Transport::Http { .. } => "http",
            Transport::Unsupported(name) => name,
        }
    }
}

/// A named downstream subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub transport: Transport,
    /// Subscription fields; empty means every item.
    pub fields: Vec<String>,
    /// Delivery failures are logged and ignored for test services.
    pub test: bool,
}

/// Service entry as written in the services file.
#[derive(Debug, Deserialize)]
struct RawService {
    transport: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    test: bool,
    url: Option<String>,
    endpoint: Option<String>,
    method: Option<String>,
    token: Option<String>,
}

impl RawService {
    fn into_service(self, name: String) -> Result<ServiceConfig, ConfigError> {
        let require = |value: Option<String>, setting: &'static str| {
            value.ok_or_else(|| ConfigError::MissingSetting {
                service: name.clone(),
                setting,
            })
        };

        let transport = match self.transport.as_str() {
            "http" => Transport::Http {
                url: require(self.url, "url")?,
                token: self.token,
            },
            "rpc" => Transport::Rpc {
                endpoint: require(self.endpoint, "endpoint")?,
                method: require(self.method, "method")?,
                token: self.token,
            },
            other => {
                warn!(service = %name, transport = other, "service_transport_unsupported");
                Transport::Unsupported(other.to_string())
            }
        };

        Ok(ServiceConfig {
            name,
            transport,
            fields: self.fields,
            test: self.test,
        })
    }
}

/// Parse the services JSON document. Services come back in name order.
pub fn parse_services(raw: &str) -> Result<Vec<ServiceConfig>, ConfigError> {
    let services: BTreeMap<String, RawService> = serde_json::from_str(raw)?;

    services
        .into_iter()
        .map(|(name, raw)| raw.into_service(name))
        .collect()
}

/// Read and parse the services file at `path`.
pub fn load_services(path: &str) -> Result<Vec<ServiceConfig>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_services(&raw)
}
