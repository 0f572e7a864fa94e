//! Installation: the state shared by every request flowing through one
//! middleware instance.
//!
//! # Responsibilities
//! - Validate and normalize a [`FetchConfig`] once, at setup time
//! - Own the agent pool shared by all requests
//! - Build per-request [`Fetcher`]s
//!
//! # Design Decisions
//! - Prefix trailing slashes are stripped here, so resolution is a plain concat
//! - The agent pool is created with the installation; a second installation
//!   gets its own pool

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::validation::is_absolute_http;
use crate::fetch::agent::AgentPool;
use crate::fetch::augment::Augmentor;
use crate::fetch::config::FetchConfig;
use crate::fetch::error::InstallError;
use crate::fetch::serializer::Serializer;
use crate::fetch::wrapper::Fetcher;
use crate::http::request::RequestContext;
use crate::http::response::CookieSink;
use crate::observability::metrics;

pub(crate) struct Inner {
    pub(crate) prefix: Option<String>,
    pub(crate) augmentors: Vec<Arc<dyn Augmentor>>,
    pub(crate) serializer: Option<Arc<dyn Serializer>>,
    pub(crate) agents: Arc<AgentPool>,
    /// Used when no agent was selected for a call.
    pub(crate) fallback: reqwest::Client,
    trust_proxy: bool,
    wrappers_built: AtomicU64,
}

/// Cheap-to-clone handle on one installation.
#[derive(Clone)]
pub struct FetchInstallation {
    inner: Arc<Inner>,
}

impl FetchInstallation {
    /// Validate `config` and build the shared state.
    pub fn install(config: FetchConfig) -> Result<Self, InstallError> {
        // An empty prefix means no prefix.
        let prefix = match config.prefix.filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let trimmed = raw.trim_end_matches('/');
                if !is_absolute_http(trimmed) {
                    return Err(InstallError::InvalidPrefix(raw));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        if config.agents.max_connections == 0 {
            return Err(InstallError::InvalidAgentLimit);
        }

        let agents = AgentPool::new(&config.agents).map_err(InstallError::Client)?;
        let fallback = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.agents.connect_timeout_secs))
            .build()
            .map_err(InstallError::Client)?;
        let augmentors = config.augments.build();

        tracing::info!(
            prefix = ?prefix,
            augments = ?config.augments,
            serializer = config.serializer.is_some(),
            max_connections = config.agents.max_connections,
            "Fetch helper installed"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                prefix,
                augmentors,
                serializer: config.serializer,
                agents: Arc::new(agents),
                fallback,
                trust_proxy: config.trust_proxy,
                wrappers_built: AtomicU64::new(0),
            }),
        })
    }

    /// Build the fetch wrapper for one request.
    pub fn build_wrapper(&self, request: RequestContext, cookies: CookieSink) -> Fetcher {
        self.inner.wrappers_built.fetch_add(1, Ordering::Relaxed);
        metrics::record_wrapper_built();
        tracing::debug!(method = %request.method(), uri = %request.uri(), "Building fetch wrapper");
        Fetcher::new(self.clone(), request, cookies)
    }

    /// Normalized prefix (no trailing slash).
    pub fn prefix(&self) -> Option<&str> {
        self.inner.prefix.as_deref()
    }

    pub fn trust_proxy(&self) -> bool {
        self.inner.trust_proxy
    }

    pub fn shared_agents(&self) -> &Arc<AgentPool> {
        &self.inner.agents
    }

    /// How many wrappers this installation has built so far.
    pub fn wrappers_built(&self) -> u64 {
        self.inner.wrappers_built.load(Ordering::Relaxed)
    }

    pub(crate) fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl fmt::Debug for FetchInstallation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchInstallation")
            .field("prefix", &self.inner.prefix)
            .field("augmentors", &self.inner.augmentors.len())
            .field("serializer", &self.inner.serializer.is_some())
            .field("trust_proxy", &self.inner.trust_proxy)
            .finish()
    }
}
