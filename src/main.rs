//! Single-upstream API-key gateway.
//!
//! Authenticates inbound callers with a static API key, rate-limits them,
//! rewrites approved requests for one fixed upstream (injecting the
//! upstream credential into the query string) and relays the upstream
//! response back verbatim.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │                 PROXY                        │
//!  Client Request   │  ┌──────┐   ┌─────────┐   ┌─────────┐       │
//!  ─────────────────┼─▶│ auth │──▶│  rate   │──▶│ rewrite │───────┼──▶ Upstream
//!                   │  └──────┘   │  limit  │   └─────────┘       │
//!                   │             └─────────┘                     │
//!  Client Response  │                 ┌─────────┐                 │
//!  ◀────────────────┼─────────────────│  relay  │◀────────────────┼──── Upstream
//!                   │                 └─────────┘                 │
//!                   └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use smartvend_proxy::config;
use smartvend_proxy::http::HttpServer;
use smartvend_proxy::lifecycle::{signals, Shutdown};
use smartvend_proxy::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "smartvend-proxy", about = "API-key gateway for the SmartVend API")]
struct Cli {
    /// Load environment variables from this file instead of `.env`.
    #[arg(long)]
    env_file: Option<std::path::PathBuf>,

    /// Override the listen port from the environment.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let mut config = config::from_env()?;
    if let Some(port) = cli.port {
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        rate_limit_enabled = config.rate_limit.enabled,
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
