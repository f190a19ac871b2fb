//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overlay)
//!     → validation.rs (gateway or client checks)
//!     → RelayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - The provider credential comes from the environment and is handed to the
//!   provider client once at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError, API_KEY_ENV_VAR, DEFAULT_NETWORK_ENV_VAR};
pub use schema::{
    ClientConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProviderConfig, RelayConfig,
    SecurityConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_client, validate_gateway, ValidationError};
