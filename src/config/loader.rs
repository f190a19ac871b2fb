//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::ValidationError;

/// Environment variable holding the provider bearer credential.
pub const API_KEY_ENV_VAR: &str = "SPONSOR_PROVIDER_API_KEY";
/// Environment variable overriding the default network.
pub const DEFAULT_NETWORK_ENV_VAR: &str = "SPONSOR_DEFAULT_NETWORK";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file, or defaults when `path` is `None`,
/// then overlay the process environment.
///
/// Semantic validation is left to the caller, since the gateway and the CLI
/// need different sections.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(RelayConfig::from_env_only());
    };

    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

impl RelayConfig {
    /// Defaults plus environment overrides, for running without a config file.
    pub fn from_env_only() -> Self {
        apply_env_overrides(RelayConfig::default(), |key| std::env::var(key).ok())
    }
}

/// Overlay environment values. Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(key) = non_empty(API_KEY_ENV_VAR) {
        config.provider.api_key = key;
    }
    if let Some(network) = non_empty(DEFAULT_NETWORK_ENV_VAR) {
        config.provider.default_network = network;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::io::Write;

    #[test]
    fn test_load_minimal_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:9999"

[provider]
default_network = "devnet"

[observability]
log_format = "json"

[client]
rpc_urls = ["http://127.0.0.1:9000"]
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.provider.timeout_secs, 15);
        assert_eq!(config.client.finality_timeout_secs, 30);
        assert_eq!(config.client.rpc_urls.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(Some(file.path())), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_no_file_uses_defaults() {
        let config = load_config(None).unwrap();
        let defaults = RelayConfig::default();
        assert_eq!(config.listener.bind_address, defaults.listener.bind_address);
        assert_eq!(config.timeouts.request_secs, defaults.timeouts.request_secs);
        assert_eq!(config.client.gateway_url, defaults.client.gateway_url);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/relay.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(RelayConfig::default(), |key| match key {
            API_KEY_ENV_VAR => Some("enoki_private_abc".to_string()),
            DEFAULT_NETWORK_ENV_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.provider.api_key, "enoki_private_abc");
        assert_eq!(config.provider.default_network, "testnet");
    }
}
