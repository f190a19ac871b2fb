//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is meant
//! for production, pretty output for development.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("sponsor_relay={level},sponsor_cli={level},tower_http={level}")
}

/// Install the global subscriber. Later calls are ignored (tests may race here).
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
