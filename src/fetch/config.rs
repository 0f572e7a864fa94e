//! Runtime fetch configuration.

use std::fmt;
use std::sync::Arc;

use crate::config::{AgentSettings, FetchSettings};
use crate::fetch::augment::Augments;
use crate::fetch::serializer::{self, Serializer};

/// Everything an installation is built from.
#[derive(Clone, Default)]
pub struct FetchConfig {
    pub prefix: Option<String>,
    pub augments: Augments,
    pub serializer: Option<Arc<dyn Serializer>>,
    pub trust_proxy: bool,
    pub agents: AgentSettings,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from file-backed settings.
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self {
            prefix: settings.prefix.clone(),
            augments: Augments::Toggles(settings.augments.into()),
            serializer: settings.serializer.map(serializer::from_kind),
            trust_proxy: settings.trust_proxy,
            agents: settings.agents.clone(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn augments(mut self, augments: impl Into<Augments>) -> Self {
        self.augments = augments.into();
        self
    }

    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn agents(mut self, agents: AgentSettings) -> Self {
        self.agents = agents;
        self
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("prefix", &self.prefix)
            .field("augments", &self.augments)
            .field("serializer", &self.serializer.is_some())
            .field("trust_proxy", &self.trust_proxy)
            .field("agents", &self.agents)
            .finish()
    }
}
