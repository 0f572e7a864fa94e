//! Connection agents.
//!
//! # Responsibilities
//! - One reusable client per URL scheme (`http:` / `https:`)
//! - Bound concurrent in-flight calls per scheme (default 2)
//! - Shared by every request flowing through one installation
//!
//! # Design Decisions
//! - Connection reuse is left to reqwest's own pool
//! - The concurrency bound is a semaphore permit held until response headers arrive

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

use crate::config::AgentSettings;

/// Schemes an [`AgentPool`] carries an agent for.
pub const SCHEMES: [&str; 2] = ["http:", "https:"];

/// A pooled-connection handle for one scheme.
#[derive(Debug, Clone)]
pub struct Agent {
    scheme: &'static str,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl Agent {
    /// Create an agent allowing `settings.max_connections` concurrent calls.
    pub fn new(scheme: &'static str, settings: &AgentSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(settings.max_connections)
            .pool_idle_timeout(Duration::from_secs(settings.pool_idle_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()?;

        Ok(Self {
            scheme,
            client,
            permits: Arc::new(Semaphore::new(settings.max_connections)),
            max_connections: settings.max_connections,
        })
    }

    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Permits not currently held by in-flight calls.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free connection slot.
    pub(crate) async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        // The semaphore is never closed, so this only waits.
        self.permits.clone().acquire_owned().await.ok()
    }

    /// Whether two handles share the same slots.
    pub fn same_as(&self, other: &Agent) -> bool {
        Arc::ptr_eq(&self.permits, &other.permits)
    }
}

/// Mapping from scheme to agent, created once per installation.
#[derive(Debug)]
pub struct AgentPool {
    agents: HashMap<&'static str, Agent>,
}

impl AgentPool {
    pub fn new(settings: &AgentSettings) -> Result<Self, reqwest::Error> {
        let mut agents = HashMap::new();
        for scheme in SCHEMES {
            agents.insert(scheme, Agent::new(scheme, settings)?);
        }
        Ok(Self { agents })
    }

    /// Look up an agent by scheme key (`"http:"`, `"https:"`).
    pub fn get(&self, scheme: &str) -> Option<&Agent> {
        self.agents.get(scheme)
    }

    /// Agent for the URL's scheme.
    pub fn for_url(&self, url: &Url) -> Option<&Agent> {
        self.get(&scheme_key(url))
    }
}

/// The `"<scheme>:"` key of a URL.
pub fn scheme_key(url: &Url) -> String {
    format!("{}:", url.scheme())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_has_both_schemes() {
        let pool = AgentPool::new(&AgentSettings::default()).unwrap();
        let http = pool.get("http:").unwrap();
        let https = pool.get("https:").unwrap();
        assert_eq!(http.scheme(), "http:");
        assert_eq!(https.scheme(), "https:");
        assert_eq!(http.max_connections(), 2);
        assert!(!http.same_as(https));
    }

    #[test]
    fn test_for_url() {
        let pool = AgentPool::new(&AgentSettings::default()).unwrap();
        let url = Url::parse("https://example.com/a").unwrap();
        assert_eq!(pool.for_url(&url).unwrap().scheme(), "https:");

        let url = Url::parse("ftp://example.com/a").unwrap();
        assert!(pool.for_url(&url).is_none());
    }

    #[tokio::test]
    async fn test_permits_are_bounded() {
        let agent = Agent::new("http:", &AgentSettings::default()).unwrap();
        let first = agent.acquire().await;
        let second = agent.acquire().await;
        assert!(first.is_some() && second.is_some());
        assert_eq!(agent.available(), 0);

        drop(first);
        assert_eq!(agent.available(), 1);
    }
}
