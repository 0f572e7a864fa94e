//! Error types for installation and per-call failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Setup-time failures. Installation never partially succeeds.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("prefix '{0}' is not an absolute http(s) URL")]
    InvalidPrefix(String),

    #[error("connection agents need a limit greater than zero")]
    InvalidAgentLimit,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failures of a single `Fetcher::fetch` call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("serializer failed: {0}")]
    Serialize(#[from] SerializeError),

    /// No connection slot freed up before the call's timeout ran out.
    #[error("timed out after {0:?} waiting for a connection slot")]
    Timeout(std::time::Duration),

    /// Anything reported by the HTTP client, passed through as is.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Failures while encoding a structured body.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("form encoding failed: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    #[error("{0}")]
    Custom(String),
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = match &self {
            FetchError::Transport(_) => StatusCode::BAD_GATEWAY,
            FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, status = %status, "Upstream fetch failed");
        (status, self.to_string()).into_response()
    }
}
