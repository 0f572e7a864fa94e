//! Inbound request context.
//!
//! # Responsibilities
//! - Snapshot what augmentors need from the inbound request
//! - Resolve the client IP and proxy chain
//!
//! # Design Decisions
//! - Without `trust_proxy` the client IP is the socket peer and the chain is empty
//! - With `trust_proxy` the chain is the inbound `X-Forwarded-For` list and the
//!   client IP is its first entry (falling back to the socket peer)
//! - Unparsable `X-Forwarded-For` entries are skipped

use axum::extract::ConnectInfo;
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use std::net::{IpAddr, SocketAddr};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// What the fetch wrapper knows about the request it was built for.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    ip: Option<IpAddr>,
    ips: Vec<IpAddr>,
}

impl RequestContext {
    /// Empty context with only a client IP, mostly for tests and manual use.
    pub fn new(ip: Option<IpAddr>) -> Self {
        Self {
            ip,
            ..Default::default()
        }
    }

    pub fn from_parts(parts: &Parts, trust_proxy: bool) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Self::build(&parts.method, &parts.uri, &parts.headers, peer, trust_proxy)
    }

    pub fn from_request<B>(request: &Request<B>, trust_proxy: bool) -> Self {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Self::build(request.method(), request.uri(), request.headers(), peer, trust_proxy)
    }

    fn build(
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        peer: Option<IpAddr>,
        trust_proxy: bool,
    ) -> Self {
        let ips = if trust_proxy {
            forwarded_chain(headers)
        } else {
            Vec::new()
        };
        let ip = ips.first().copied().or(peer);

        Self {
            method: method.clone(),
            uri: uri.clone(),
            headers: headers.clone(),
            ip,
            ips,
        }
    }

    pub fn with_ips(mut self, ips: Vec<IpAddr>) -> Self {
        self.ips = ips;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Resolved client IP.
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Proxy chain, client first.
    pub fn ips(&self) -> &[IpAddr] {
        &self.ips
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}

fn forwarded_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::debug!(entry = %entry, "Skipping unparsable X-Forwarded-For entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(xff: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(xff) = xff {
            builder = builder.header("x-forwarded-for", xff);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.1:4000".parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_untrusted_uses_peer() {
        let ctx = RequestContext::from_request(&request(Some("123.123.123.123")), false);
        assert_eq!(ctx.ip(), Some("10.0.0.1".parse().unwrap()));
        assert!(ctx.ips().is_empty());
    }

    #[test]
    fn test_trusted_uses_forwarded_chain() {
        let ctx = RequestContext::from_request(
            &request(Some("127.0.0.1, 123.123.123.123,135.135.135.135")),
            true,
        );
        assert_eq!(ctx.ip(), Some("127.0.0.1".parse().unwrap()));
        assert_eq!(ctx.ips().len(), 3);
        assert_eq!(ctx.ips()[2], "135.135.135.135".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_without_header_falls_back_to_peer() {
        let ctx = RequestContext::from_request(&request(None), true);
        assert_eq!(ctx.ip(), Some("10.0.0.1".parse().unwrap()));
        assert!(ctx.ips().is_empty());
    }

    #[test]
    fn test_garbage_entries_are_skipped() {
        let ctx = RequestContext::from_request(&request(Some("unknown, 8.8.8.8")), true);
        assert_eq!(ctx.ips(), &["8.8.8.8".parse::<IpAddr>().unwrap()]);
    }
}
