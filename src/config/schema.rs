//! Configuration schema definitions.
//!
//! These are the parts of the fetch configuration that can live in a file.
//! Closures (custom augmentors, custom serializers) are attached later through
//! [`crate::fetch::FetchConfig`].

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Fetch helper settings.
    pub fetch: FetchSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// File-backed fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FetchSettings {
    /// Prepended to root-relative URLs (e.g., "http://127.0.0.1:3000").
    pub prefix: Option<String>,

    /// Derive client IP and proxy chain from inbound `X-Forwarded-For`.
    pub trust_proxy: bool,

    /// Built-in augmentor toggles.
    pub augments: AugmentSettings,

    /// Connection agent settings.
    pub agents: AgentSettings,

    /// Named request-body serializer.
    pub serializer: Option<SerializerKind>,
}

/// Built-in augmentor toggles. Everything is enabled unless switched off.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct AugmentSettings {
    /// Pick a pooled agent by URL scheme.
    pub agent: bool,

    /// Relay the inbound `Cookie` header.
    pub cookies: bool,

    /// Set `X-Forwarded-For` from the client IP chain.
    pub ips: bool,
}

impl Default for AugmentSettings {
    fn default() -> Self {
        Self {
            agent: true,
            cookies: true,
            ips: true,
        }
    }
}

/// Connection agent settings, applied to each scheme's agent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum concurrent in-flight calls per scheme.
    pub max_connections: usize,

    /// Idle pooled connection timeout in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_connections: 2,
            pool_idle_timeout_secs: 90,
            connect_timeout_secs: 5,
        }
    }
}

/// Built-in serializers selectable from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerKind {
    Json,
    Form,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "req_fetch=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
