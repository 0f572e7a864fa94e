//! Gateway HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the relay handler
//! - Install the fetch middleware from configuration
//! - Wire up timeout and tracing layers
//! - Relay every inbound request to the configured upstream prefix

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::cookie::PathPolicy;
use crate::fetch::{FetchConfig, FetchError, FetchInstallation, FetchOptions, InstallError};
use crate::http::middleware::Fetch;

/// Largest inbound body the relay buffers.
const MAX_RELAY_BODY: usize = 2 * 1024 * 1024;

/// Relays requests to an upstream through the fetch helper.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    installation: FetchInstallation,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Result<Self, InstallError> {
        let installation = FetchInstallation::install(FetchConfig::from_settings(&config.fetch))?;
        let router = Self::build_router(&config, &installation);
        Ok(Self {
            router,
            config,
            installation,
        })
    }

    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, installation: &FetchInstallation) -> Router {
        let relay = Router::new()
            .route("/{*path}", any(relay_handler))
            .route("/", any(relay_handler));

        installation.apply(relay).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.listener.request_timeout_secs,
                ))),
        )
    }

    /// The router, for driving the gateway without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn installation(&self) -> &FetchInstallation {
        &self.installation
    }

    /// Serve on `listener` until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Forward the request upstream and relay status, body, content type and cookies.
async fn relay_handler(fetch: Fetch, request: Request<Body>) -> Result<Response, FetchError> {
    let target = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, MAX_RELAY_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return Ok((StatusCode::BAD_REQUEST, "Unreadable request body").into_response());
        }
    };

    let mut options = FetchOptions::new().method(parts.method);
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        options = options.header(header::CONTENT_TYPE, content_type.clone());
    }
    if !body.is_empty() {
        options = options.body(body);
    }

    let upstream = fetch.fetch(&target, options).await?;
    fetch.forward_cookie(&upstream, PathPolicy::Root);

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await?;

    let mut response = (status, bytes).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
