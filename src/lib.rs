//! Per-request upstream fetch helper for axum.
//!
//! Every request gets a memoized [`Fetcher`] that resolves root-relative URLs
//! against a configured prefix, relays the caller's cookies and client IP
//! chain, reuses pooled connection agents, and can forward upstream
//! `Set-Cookie` headers back to the client.

pub mod config;
pub mod cookie;
pub mod fetch;
pub mod http;
pub mod observability;

pub use cookie::{forward_cookie, PathPolicy};
pub use fetch::{FetchConfig, FetchError, FetchInstallation, FetchOptions, Fetcher, InstallError};
pub use http::{install_on, Fetch, GatewayServer, RequestContext};
