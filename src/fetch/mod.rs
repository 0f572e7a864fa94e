//! Fetch augmentation subsystem.
//!
//! # Data Flow
//! ```text
//! FetchConfig
//!     → install.rs (validate, build agent pool + augmentor list)
//!     → FetchInstallation (shared by all requests)
//!     → wrapper.rs (one Fetcher per request)
//!     → augment.rs / serializer.rs mutate options.rs
//!     → agent.rs picks the reqwest client that performs the call
//! ```

pub mod agent;
pub mod augment;
pub mod config;
pub mod error;
pub mod install;
pub mod options;
pub mod serializer;
pub mod wrapper;

pub use agent::{Agent, AgentPool};
pub use augment::{AgentSelector, AugmentToggles, Augmentor, Augments, CookieRelay, ForwardedFor};
pub use config::FetchConfig;
pub use error::{FetchError, InstallError, SerializeError};
pub use install::FetchInstallation;
pub use options::{FetchBody, FetchOptions};
pub use serializer::Serializer;
pub use wrapper::{resolve_url, Fetcher};
