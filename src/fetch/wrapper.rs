//! The per-request fetch wrapper.
//!
//! A [`Fetcher`] is bound to one inbound request. Each call:
//!
//! ```text
//! url ──▶ resolve against prefix ──▶ parse
//!     ──▶ attach shared agents ──▶ augmentors (in order)
//!     ──▶ serializer (structured bodies only)
//!     ──▶ reqwest, through the selected agent
//! ```
//!
//! Whatever reqwest returns comes back unchanged: non-2xx statuses are
//! `Ok`, transport failures are `FetchError::Transport`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::cookie::{rewrite_set_cookies, PathPolicy};
use crate::fetch::agent::AgentPool;
use crate::fetch::error::FetchError;
use crate::fetch::install::FetchInstallation;
use crate::fetch::options::FetchOptions;
use crate::http::request::RequestContext;
use crate::http::response::CookieSink;
use crate::observability::metrics;

/// Fetch helper bound to one request.
pub struct Fetcher {
    installation: FetchInstallation,
    request: RequestContext,
    cookies: CookieSink,
}

impl Fetcher {
    pub(crate) fn new(
        installation: FetchInstallation,
        request: RequestContext,
        cookies: CookieSink,
    ) -> Self {
        Self {
            installation,
            request,
            cookies,
        }
    }

    /// Perform a call on behalf of the bound request.
    pub async fn fetch(
        &self,
        url: &str,
        mut options: FetchOptions,
    ) -> Result<reqwest::Response, FetchError> {
        let inner = self.installation.inner();

        let resolved = resolve_url(inner.prefix.as_deref(), url);
        tracing::debug!(url = %resolved, "Request URL");
        let url = Url::parse(&resolved).map_err(|source| FetchError::InvalidUrl {
            url: resolved.clone(),
            source,
        })?;

        options.shared_agents = Some(inner.agents.clone());
        for augmentor in &inner.augmentors {
            augmentor.augment(&url, &mut options, &self.request);
        }

        if let Some(serializer) = &inner.serializer {
            if options.body.as_ref().is_some_and(|b| b.is_structured()) {
                serializer.serialize(&url, &mut options, &self.request)?;
            }
        }

        tracing::debug!(url = %url, method = %options.method, headers = ?options.headers, "Dispatching upstream request");
        self.dispatch(url, options).await
    }

    async fn dispatch(
        &self,
        url: Url,
        options: FetchOptions,
    ) -> Result<reqwest::Response, FetchError> {
        let FetchOptions {
            method,
            headers,
            body,
            agent,
            timeout,
            ..
        } = options;

        let client = agent
            .as_ref()
            .map(|a| a.client())
            .unwrap_or(&self.installation.inner().fallback);
        let mut builder = client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body.into_body()?);
        }

        // The timeout covers the wait for a slot as well as the call itself.
        let start = Instant::now();
        let slot = async {
            match &agent {
                Some(agent) => agent.acquire().await,
                None => None,
            }
        };
        let _permit = match timeout {
            Some(limit) => {
                let permit = match tokio::time::timeout(limit, slot).await {
                    Ok(permit) => permit,
                    Err(_) => {
                        metrics::record_upstream_request(method.as_str(), None, start);
                        tracing::warn!(timeout = ?limit, "Timed out waiting for a connection slot");
                        return Err(FetchError::Timeout(limit));
                    }
                };
                builder = builder.timeout(limit.saturating_sub(start.elapsed()));
                permit
            }
            None => slot.await,
        };

        let result = builder.send().await;
        metrics::record_upstream_request(
            method.as_str(),
            result.as_ref().ok().map(|r| r.status().as_u16()),
            start,
        );

        Ok(result?)
    }

    /// Queue the upstream response's cookies for this request's response.
    ///
    /// They are appended after any `Set-Cookie` the handler sets itself.
    pub fn forward_cookie(&self, upstream: &reqwest::Response, policy: impl Into<PathPolicy>) {
        let cookies = rewrite_set_cookies(upstream.headers(), &policy.into());
        if cookies.is_empty() {
            return;
        }
        tracing::debug!(count = cookies.len(), url = %upstream.url(), "Queued upstream cookies");
        self.cookies.extend(cookies);
    }

    /// The installation-wide agent pool.
    pub fn shared_agents(&self) -> &Arc<AgentPool> {
        self.installation.shared_agents()
    }

    /// The request this wrapper is bound to.
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Resolve `url` the way `fetch` would.
    pub fn resolve(&self, url: &str) -> String {
        resolve_url(self.installation.prefix(), url)
    }
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("installation", &self.installation)
            .field("request", &self.request)
            .finish()
    }
}

/// Prefix root-relative URLs. `prefix` must already be free of trailing slashes.
pub fn resolve_url(prefix: Option<&str>, url: &str) -> String {
    match prefix {
        Some(prefix) if url.starts_with('/') => format!("{}{}", prefix, url),
        _ => url.to_string(),
    }
}
