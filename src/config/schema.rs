//! TOML schema for the gateway and the client.
//!
//! Every section has defaults so a minimal file (or none at all) works.

use serde::{Deserialize, Serialize};

/// Root configuration shared by the gateway and the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Where the gateway accepts connections.
    pub listener: ListenerConfig,

    /// Upstream sponsorship provider.
    pub provider: ProviderConfig,

    pub timeouts: TimeoutConfig,

    pub security: SecurityConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Settings for the sponsorship client side (CLI, embedding apps).
    pub client: ClientConfig,
}

/// Gateway listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Socket address, e.g. `0.0.0.0:8080`.
    pub bind_address: String,

    /// Serve HTTPS when set.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// PEM files for TLS termination.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Certificate chain.
    pub cert_path: String,

    pub key_path: String,
}

/// Sponsorship provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API base URL.
    pub base_url: String,

    /// Bearer credential. Normally left empty in files and supplied through
    /// `SPONSOR_PROVIDER_API_KEY`.
    pub api_key: String,

    /// Network used when a sponsor request names none.
    pub default_network: String,

    /// Total timeout for one provider call in seconds.
    pub timeout_secs: u64,

    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.enoki.mystenlabs.com".to_string(),
            api_key: String::new(),
            default_network: "testnet".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("default_network", &self.default_network)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Gateway request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request budget in seconds, provider call included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Input limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 256 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Client-side flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the sponsorship gateway.
    pub gateway_url: String,

    /// JSON-RPC endpoints, primary first.
    pub rpc_urls: Vec<String>,

    pub network: String,

    /// Per-call RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// End-to-end budget for sponsor, execute and finality, in seconds.
    pub flow_timeout_secs: u64,

    pub finality_timeout_secs: u64,

    pub poll_base_delay_ms: u64,

    pub poll_max_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:8080".to_string(),
            rpc_urls: vec!["https://fullnode.testnet.sui.io:443".to_string()],
            network: "testnet".to_string(),
            rpc_timeout_secs: 10,
            flow_timeout_secs: 60,
            finality_timeout_secs: 30,
            poll_base_delay_ms: 200,
            poll_max_delay_ms: 2_000,
        }
    }
}
