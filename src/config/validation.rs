//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (connection limits > 0, addresses parse)
//! - Check the prefix is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{FetchSettings, GatewayConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("prefix '{0}' is not an absolute http(s) URL")]
    Prefix(String),

    #[error("agents.max_connections must be greater than zero")]
    MaxConnections,

    #[error("listener.request_timeout_secs must be greater than zero")]
    RequestTimeout,
}

/// Validate a full gateway configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if let Err(mut fetch_errors) = validate_settings(&config.fetch) {
        errors.append(&mut fetch_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the fetch settings on their own.
pub fn validate_settings(settings: &FetchSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(prefix) = settings.prefix.as_deref().filter(|p| !p.is_empty()) {
        if !is_absolute_http(prefix.trim_end_matches('/')) {
            errors.push(ValidationError::Prefix(prefix.to_string()));
        }
    }
    if settings.agents.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn is_absolute_http(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}
