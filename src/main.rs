//! ShopSphere Edge Gateway
//!
//! An edge dispatcher in front of the user, product and order services.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  EDGE GATEWAY                    │
//!                        │                                                  │
//!   Client Request       │  ┌──────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────────┼─▶│  rate    │──▶│   auth   │──▶│   routing   │  │
//!                        │  │ limiter  │   │   gate   │   │    table    │  │
//!                        │  └──────────┘   └──────────┘   └──────┬──────┘  │
//!                        │                                       │         │
//!                        │                                       ▼         │
//!   Client Response      │  ┌──────────┐                  ┌─────────────┐  │
//!   ◀────────────────────┼──│ response │◀─────────────────│    proxy    │◀─┼──── Backend
//!                        │  │  relay   │                  │   client    │  │     Service
//!                        │  └──────────┘                  └─────────────┘  │
//!                        │                                                 │
//!                        │  ┌───────────────────────────────────────────┐  │
//!                        │  │           Cross-Cutting Concerns          │  │
//!                        │  │  ┌────────┐ ┌──────────┐ ┌─────────────┐  │  │
//!                        │  │  │ config │ │ registry │ │health probe │  │  │
//!                        │  │  │        │ │          │ │    loop     │  │  │
//!                        │  │  └────────┘ └──────────┘ └─────────────┘  │  │
//!                        │  │  ┌─────────────────┐ ┌────────────────┐   │  │
//!                        │  │  │  observability  │ │   lifecycle    │   │  │
//!                        │  │  └─────────────────┘ └────────────────┘   │  │
//!                        │  └───────────────────────────────────────────┘  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopsphere_gateway::config;
use shopsphere_gateway::http::GatewayServer;
use shopsphere_gateway::lifecycle::{signals, Shutdown};

#[derive(Parser)]
#[command(name = "shopsphere-gateway")]
#[command(about = "Edge gateway for the ShopSphere services", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopsphere_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shopsphere-gateway starting");

    let config = config::load(args.config.as_deref())?;

    tracing::info!(
        environment = %config.environment,
        bind_address = %config.listener.bind_address,
        health_check_interval_ms = config.health_check.interval_ms,
        "Configuration loaded"
    );
    for service in &config.services {
        tracing::info!(service = %service.name, url = %service.url, "Service endpoint configured");
    }

    // Bind the listener up front: failure to bind is the one fatal error.
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            shopsphere_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_terminate().await;
            shutdown.trigger();
        });
    }

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
