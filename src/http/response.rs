//! Outgoing response handling.
//!
//! # Responsibilities
//! - Hold cookies forwarded during a request until the handler's response exists
//! - Append them after whatever `Set-Cookie` values the handler set itself

use axum::http::HeaderValue;
use axum::response::Response;
use std::sync::{Arc, Mutex, PoisonError};

use crate::cookie::append_set_cookies;
use crate::observability::metrics;

/// Per-request queue of rewritten `Set-Cookie` values.
#[derive(Debug, Clone, Default)]
pub struct CookieSink {
    pending: Arc<Mutex<Vec<HeaderValue>>>,
}

impl CookieSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I>(&self, cookies: I)
    where
        I: IntoIterator<Item = HeaderValue>,
    {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(cookies);
    }

    /// Remove and return everything queued so far.
    pub fn take(&self) -> Vec<HeaderValue> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flush queued cookies onto `response`. Returns the number appended.
pub fn apply_pending_cookies(response: &mut Response, sink: &CookieSink) -> usize {
    let cookies = sink.take();
    if cookies.is_empty() {
        return 0;
    }

    let appended = append_set_cookies(response.headers_mut(), cookies);
    metrics::record_cookies_forwarded(appended);
    tracing::debug!(count = appended, "Appended forwarded cookies to response");
    appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    #[test]
    fn test_pending_cookies_follow_existing() {
        let sink = CookieSink::new();
        sink.extend([HeaderValue::from_static("up=1; Path=/")]);
        assert_eq!(sink.len(), 1);

        let mut response = ([(SET_COOKIE, "a=b")], "OK").into_response();
        assert_eq!(apply_pending_cookies(&mut response, &sink), 1);

        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=b", "up=1; Path=/"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_empty_sink_is_noop() {
        let mut response = "OK".into_response();
        let before = response.headers().clone();
        assert_eq!(apply_pending_cookies(&mut response, &CookieSink::new()), 0);
        assert_eq!(response.headers(), &before);
    }
}
