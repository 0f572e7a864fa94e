//! Augmentors: functions that mutate outgoing options before dispatch.
//!
//! Built-ins run in a fixed order (agent → cookie relay → forwarded-for),
//! followed by an optional custom augmentor. A later augmentor sees, and may
//! overwrite, whatever an earlier one set.

use axum::http::header::COOKIE;
use axum::http::HeaderValue;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use url::Url;

use crate::config::AugmentSettings;
use crate::fetch::agent::scheme_key;
use crate::fetch::options::FetchOptions;
use crate::http::request::{RequestContext, X_FORWARDED_FOR};

/// Mutates `options` in place for a call to `url` made on behalf of `request`.
pub trait Augmentor: Send + Sync {
    fn augment(&self, url: &Url, options: &mut FetchOptions, request: &RequestContext);
}

impl<F> Augmentor for F
where
    F: Fn(&Url, &mut FetchOptions, &RequestContext) + Send + Sync,
{
    fn augment(&self, url: &Url, options: &mut FetchOptions, request: &RequestContext) {
        self(url, options, request)
    }
}

/// Picks the shared agent matching the URL scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentSelector;

impl Augmentor for AgentSelector {
    fn augment(&self, url: &Url, options: &mut FetchOptions, _request: &RequestContext) {
        let scheme = scheme_key(url);
        tracing::debug!(scheme = %scheme, "Using shared agent");
        options.agent = options
            .shared_agents
            .as_ref()
            .and_then(|pool| pool.get(&scheme))
            .cloned();
    }
}

/// Copies the inbound `Cookie` header onto the outgoing call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieRelay;

impl Augmentor for CookieRelay {
    fn augment(&self, _url: &Url, options: &mut FetchOptions, request: &RequestContext) {
        let values: Vec<&str> = request
            .headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            return;
        }

        let joined = values.join("; ");
        tracing::debug!(cookies = %joined, "Relaying inbound cookies");
        if let Ok(value) = HeaderValue::from_str(&joined) {
            options.headers.insert(COOKIE, value);
        }
    }
}

/// Sets `X-Forwarded-For` from the client IP chain, leaving out local addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedFor;

impl Augmentor for ForwardedFor {
    fn augment(&self, _url: &Url, options: &mut FetchOptions, request: &RequestContext) {
        let chain = forwarded_ips(request);
        tracing::debug!(ips = ?chain, "Forwarded client IPs");
        if chain.is_empty() {
            return;
        }

        let joined = chain
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        if let Ok(value) = HeaderValue::from_str(&joined) {
            options.headers.insert(X_FORWARDED_FOR, value);
        }
    }
}

/// Client IP followed by the proxy chain, minus local addresses.
pub fn forwarded_ips(request: &RequestContext) -> Vec<IpAddr> {
    let mut chain: Vec<IpAddr> = request.ip().into_iter().collect();
    let proxies = request.ips();
    let rest = match (request.ip(), proxies.first()) {
        (Some(ip), Some(first)) if ip == *first => &proxies[1..],
        _ => proxies,
    };
    chain.extend_from_slice(rest);
    chain.retain(|ip| !is_local(ip));
    chain
}

fn is_local(ip: &IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => v4 == Ipv4Addr::LOCALHOST,
        IpAddr::V6(v6) => v6.is_unspecified() || v6.is_loopback(),
    }
}

/// Structured toggles for the built-in augmentors.
#[derive(Clone)]
pub struct AugmentToggles {
    pub agent: bool,
    pub cookies: bool,
    pub ips: bool,
    pub custom: Option<Arc<dyn Augmentor>>,
}

impl Default for AugmentToggles {
    fn default() -> Self {
        Self {
            agent: true,
            cookies: true,
            ips: true,
            custom: None,
        }
    }
}

impl AugmentToggles {
    pub fn agent(mut self, enabled: bool) -> Self {
        self.agent = enabled;
        self
    }

    pub fn cookies(mut self, enabled: bool) -> Self {
        self.cookies = enabled;
        self
    }

    pub fn ips(mut self, enabled: bool) -> Self {
        self.ips = enabled;
        self
    }

    pub fn custom<A: Augmentor + 'static>(mut self, augmentor: A) -> Self {
        self.custom = Some(Arc::new(augmentor));
        self
    }
}

impl From<AugmentSettings> for AugmentToggles {
    fn from(settings: AugmentSettings) -> Self {
        Self {
            agent: settings.agent,
            cookies: settings.cookies,
            ips: settings.ips,
            custom: None,
        }
    }
}

/// How the augmentor list of an installation is built.
#[derive(Clone)]
pub enum Augments {
    /// Built-ins in fixed order, each switchable, plus an optional custom one.
    Toggles(AugmentToggles),
    /// An explicit list that replaces the built-ins entirely.
    Replace(Vec<Arc<dyn Augmentor>>),
}

impl Default for Augments {
    fn default() -> Self {
        Self::Toggles(AugmentToggles::default())
    }
}

impl Augments {
    /// A single function replacing the built-ins.
    pub fn single<A: Augmentor + 'static>(augmentor: A) -> Self {
        Self::Replace(vec![Arc::new(augmentor)])
    }

    pub fn list(augmentors: Vec<Arc<dyn Augmentor>>) -> Self {
        Self::Replace(augmentors)
    }

    /// The ordered augmentor list.
    pub fn build(&self) -> Vec<Arc<dyn Augmentor>> {
        match self {
            Self::Replace(list) => list.clone(),
            Self::Toggles(toggles) => {
                let mut list: Vec<Arc<dyn Augmentor>> = Vec::new();
                if toggles.agent {
                    list.push(Arc::new(AgentSelector));
                }
                if toggles.cookies {
                    list.push(Arc::new(CookieRelay));
                }
                if toggles.ips {
                    list.push(Arc::new(ForwardedFor));
                }
                if let Some(custom) = &toggles.custom {
                    list.push(custom.clone());
                }
                list
            }
        }
    }
}

impl From<AugmentToggles> for Augments {
    fn from(toggles: AugmentToggles) -> Self {
        Self::Toggles(toggles)
    }
}

impl fmt::Debug for Augments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggles(t) => f
                .debug_struct("Toggles")
                .field("agent", &t.agent)
                .field("cookies", &t.cookies)
                .field("ips", &t.ips)
                .field("custom", &t.custom.is_some())
                .finish(),
            Self::Replace(list) => write!(f, "Replace({} augmentors)", list.len()),
        }
    }
}
