//! Structured logging.
//!
//! Uses `tracing` throughout the crate; the binary installs a
//! `tracing-subscriber` registry with an env filter. `RUST_LOG` wins over the
//! configured default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
