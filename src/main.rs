//! Sponsorship gateway.
//!
//! ```text
//!     browser / sponsor-cli
//!            │  POST /sponsor, POST /execute/{digest}
//!            ▼
//!   ┌──────────────────────────────────────────────┐
//!   │ sponsor-relay                                │
//!   │  request id → trace → timeout → body limit   │
//!   │  handlers: validate, default network         │
//!   │  provider client: bearer credential attached │
//!   └──────────────────────┬───────────────────────┘
//!                          ▼
//!               sponsorship provider API
//! ```
//!
//! The provider credential is read from `SPONSOR_PROVIDER_API_KEY` at startup
//! and never leaves this process.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use sponsor_relay::config::{load_config, validate_gateway, ConfigError};
use sponsor_relay::lifecycle::{spawn_signal_handler, Shutdown};
use sponsor_relay::net::load_tls_config;
use sponsor_relay::observability::{init_logging, init_metrics};
use sponsor_relay::GatewayServer;

#[derive(Parser, Debug)]
#[command(name = "sponsor-relay", version, about = "Gas sponsorship gateway")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "SPONSOR_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability);

    if let Err(errors) = validate_gateway(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        tls = config.listener.tls.is_some(),
        "sponsor-relay starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let server = GatewayServer::new(&config)?;

    let shutdown = Shutdown::new();
    let signals = spawn_signal_handler(shutdown.clone());

    match &config.listener.tls {
        Some(tls) => {
            let rustls = load_tls_config(tls).await?;
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    signals.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}
