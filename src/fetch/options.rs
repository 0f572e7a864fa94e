//! Outgoing request options.
//!
//! `FetchOptions` is the mutable record augmentors and serializers work on
//! before the call is handed to reqwest.

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::fetch::agent::{Agent, AgentPool};
use crate::fetch::error::{FetchError, SerializeError};

/// Body of an outgoing call.
#[derive(Debug)]
pub enum FetchBody {
    Bytes(Bytes),
    Text(String),
    /// A structured value that a serializer may turn into its wire form.
    Structured(serde_json::Value),
    /// Already wire-ready and streamed; serializers never touch it.
    Stream(reqwest::Body),
}

impl FetchBody {
    /// Build a structured body from any serializable value.
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, SerializeError> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// A structured body that no serializer handled goes out as JSON.
    pub(crate) fn into_body(self) -> Result<reqwest::Body, SerializeError> {
        Ok(match self {
            Self::Bytes(bytes) => reqwest::Body::from(bytes),
            Self::Text(text) => reqwest::Body::from(text),
            Self::Structured(value) => reqwest::Body::from(serde_json::to_vec(&value)?),
            Self::Stream(body) => body,
        })
    }
}

impl From<Bytes> for FetchBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for FetchBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for FetchBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&'static str> for FetchBody {
    fn from(text: &'static str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for FetchBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

impl From<reqwest::Body> for FetchBody {
    fn from(body: reqwest::Body) -> Self {
        Self::Stream(body)
    }
}

/// Mutable options for one outgoing call.
#[derive(Debug, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<FetchBody>,
    /// Agent chosen for this call; `None` uses the installation's fallback client.
    pub agent: Option<Agent>,
    /// The installation's agent pool, attached before augmentors run.
    pub shared_agents: Option<Arc<AgentPool>>,
    /// Passed through to reqwest.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the headers with a plain `name -> value` mapping.
    pub fn headers_from_pairs<I, K, V>(mut self, pairs: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let name = HeaderName::try_from(name.as_ref())
                .map_err(|e| FetchError::InvalidHeader(format!("{}: {}", name.as_ref(), e)))?;
            let value = HeaderValue::from_str(value.as_ref())
                .map_err(|e| FetchError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.append(name, value);
        }
        self.headers = headers;
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<FetchBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
