//! Forwarding upstream `Set-Cookie` headers onto an outgoing response.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use crate::cookie::attributes::{rewrite_set_cookie, PathPolicy};
use crate::observability::metrics;

/// Rewrite every `Set-Cookie` value found in `upstream`.
///
/// Values that are not valid UTF-8 are returned unchanged.
pub fn rewrite_set_cookies(upstream: &HeaderMap, policy: &PathPolicy) -> Vec<HeaderValue> {
    upstream
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| {
            let Ok(raw) = value.to_str() else {
                return value.clone();
            };
            HeaderValue::from_str(&rewrite_set_cookie(raw, policy))
                .unwrap_or_else(|_| value.clone())
        })
        .collect()
}

/// Append already-rewritten cookies after any existing `Set-Cookie` values.
pub fn append_set_cookies<I>(outgoing: &mut HeaderMap, cookies: I) -> usize
where
    I: IntoIterator<Item = HeaderValue>,
{
    let mut appended = 0;
    for cookie in cookies {
        outgoing.append(SET_COOKIE, cookie);
        appended += 1;
    }
    appended
}

/// Copy the upstream response's cookies onto the outgoing response.
///
/// `Domain` attributes are stripped and `Path` follows `policy`. Existing
/// outgoing cookies keep their position ahead of the forwarded ones. With no
/// upstream `Set-Cookie` the outgoing headers are left untouched. Returns the
/// number of cookies appended.
pub fn forward_cookie(outgoing: &mut HeaderMap, upstream: &HeaderMap, policy: &PathPolicy) -> usize {
    let cookies = rewrite_set_cookies(upstream, policy);
    if cookies.is_empty() {
        return 0;
    }

    let appended = append_set_cookies(outgoing, cookies);
    metrics::record_cookies_forwarded(appended);
    tracing::debug!(count = appended, policy = ?policy, "Forwarded upstream cookies");
    appended
}
