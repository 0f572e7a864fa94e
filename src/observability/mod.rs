//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! fetch / cookie / http subsystems produce:
//!     → tracing events (structured fields, debug level for per-call detail)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional, binary only)
//! ```

pub mod logging;
pub mod metrics;
