//! Metrics collection and exposition.
//!
//! # Metrics
//! - `req_fetch_upstream_requests_total` (counter): upstream calls by method, status
//! - `req_fetch_upstream_request_duration_seconds` (histogram): upstream latency
//! - `req_fetch_wrappers_built_total` (counter): per-request fetch wrappers constructed
//! - `req_fetch_cookies_forwarded_total` (counter): cookies copied to outgoing responses
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished upstream call. `status` is `None` on transport errors.
pub fn record_upstream_request(method: &str, status: Option<u16>, start: Instant) {
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "error".to_string());
    counter!(
        "req_fetch_upstream_requests_total",
        "method" => method.to_string(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "req_fetch_upstream_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_wrapper_built() {
    counter!("req_fetch_wrappers_built_total").increment(1);
}

pub fn record_cookies_forwarded(count: usize) {
    counter!("req_fetch_cookies_forwarded_total").increment(count as u64);
}
