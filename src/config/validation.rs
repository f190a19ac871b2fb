//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Require the provider credential for the gateway
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::schema::RelayConfig;
use crate::sponsorship::Network;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks needed before the gateway can serve.
pub fn validate_gateway(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are required",
            ));
        }
    }

    let provider = &config.provider;
    if provider.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "provider.api_key",
            "credential missing (set SPONSOR_PROVIDER_API_KEY)",
        ));
    }
    if url::Url::parse(&provider.base_url).is_err() {
        errors.push(ValidationError::new(
            "provider.base_url",
            format!("'{}' is not a URL", provider.base_url),
        ));
    }
    if let Err(e) = Network::from_str(&provider.default_network) {
        errors.push(ValidationError::new("provider.default_network", e));
    }
    if provider.timeout_secs == 0 || provider.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("provider", "timeouts must be greater than zero"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    } else if config.timeouts.request_secs <= provider.timeout_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed provider.timeout_secs ({}) so provider timeouts are reported as such",
                provider.timeout_secs
            ),
        ));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    finish(errors)
}

/// Checks needed before the client flow can run.
pub fn validate_client(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let client = &config.client;

    if url::Url::parse(&client.gateway_url).is_err() {
        errors.push(ValidationError::new(
            "client.gateway_url",
            format!("'{}' is not a URL", client.gateway_url),
        ));
    }
    match client.rpc_urls.first() {
        None => errors.push(ValidationError::new("client.rpc_urls", "at least one URL is required")),
        Some(primary) if url::Url::parse(primary).is_err() => errors.push(ValidationError::new(
            "client.rpc_urls",
            format!("primary '{}' is not a URL", primary),
        )),
        Some(_) => {}
    }
    if let Err(e) = Network::from_str(&client.network) {
        errors.push(ValidationError::new("client.network", e));
    }
    if client.rpc_timeout_secs == 0 || client.flow_timeout_secs == 0 || client.finality_timeout_secs == 0 {
        errors.push(ValidationError::new("client", "timeouts must be greater than zero"));
    }
    if client.poll_base_delay_ms == 0 || client.poll_max_delay_ms < client.poll_base_delay_ms {
        errors.push(ValidationError::new(
            "client.poll_max_delay_ms",
            "poll delays must satisfy 0 < base <= max",
        ));
    }

    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
