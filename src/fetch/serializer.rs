//! Request-body serializers.
//!
//! A serializer runs after the augmentors, and only when the body is
//! [`FetchBody::Structured`]. It replaces the body with its wire form and
//! normally sets `Content-Type`.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use std::sync::Arc;
use url::Url;

use crate::config::SerializerKind;
use crate::fetch::error::SerializeError;
use crate::fetch::options::{FetchBody, FetchOptions};
use crate::http::request::RequestContext;

pub trait Serializer: Send + Sync {
    fn serialize(
        &self,
        url: &Url,
        options: &mut FetchOptions,
        request: &RequestContext,
    ) -> Result<(), SerializeError>;
}

impl<F> Serializer for F
where
    F: Fn(&Url, &mut FetchOptions, &RequestContext) -> Result<(), SerializeError> + Send + Sync,
{
    fn serialize(
        &self,
        url: &Url,
        options: &mut FetchOptions,
        request: &RequestContext,
    ) -> Result<(), SerializeError> {
        self(url, options, request)
    }
}

/// JSON body, `application/json;charset=UTF-8`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(
        &self,
        _url: &Url,
        options: &mut FetchOptions,
        _request: &RequestContext,
    ) -> Result<(), SerializeError> {
        let Some(FetchBody::Structured(value)) = &options.body else {
            return Ok(());
        };
        let encoded = serde_json::to_vec(value)?;

        options.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        options.body = Some(FetchBody::from(encoded));
        Ok(())
    }
}

/// URL-encoded form body, `application/x-www-form-urlencoded;charset=UTF-8`.
///
/// Only flat objects encode; nested values are an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormSerializer;

impl Serializer for FormSerializer {
    fn serialize(
        &self,
        _url: &Url,
        options: &mut FetchOptions,
        _request: &RequestContext,
    ) -> Result<(), SerializeError> {
        let Some(FetchBody::Structured(value)) = &options.body else {
            return Ok(());
        };
        let encoded = serde_urlencoded::to_string(value)?;

        options.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded;charset=UTF-8"),
        );
        options.body = Some(FetchBody::Text(encoded));
        Ok(())
    }
}

pub fn json() -> Arc<dyn Serializer> {
    Arc::new(JsonSerializer)
}

pub fn form() -> Arc<dyn Serializer> {
    Arc::new(FormSerializer)
}

pub fn from_kind(kind: SerializerKind) -> Arc<dyn Serializer> {
    match kind {
        SerializerKind::Json => json(),
        SerializerKind::Form => form(),
    }
}
