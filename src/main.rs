//! req-fetch gateway.
//!
//! Relays every inbound request to the configured upstream prefix through the
//! per-request fetch helper, forwarding the caller's cookies and IP chain
//! upstream and the upstream's cookies back.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use req_fetch::config::{load_config, GatewayConfig};
use req_fetch::observability::{logging, metrics};
use req_fetch::GatewayServer;

#[derive(Parser)]
#[command(name = "req-fetch-gateway")]
#[command(about = "Relay requests upstream through the req-fetch helper", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("req-fetch-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.fetch.prefix.as_deref().map_or(true, str::is_empty) {
        return Err("fetch.prefix must be set for the gateway to know its upstream".into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = ?config.fetch.prefix,
        trust_proxy = config.fetch.trust_proxy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
