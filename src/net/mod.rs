//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! [listener.tls] configured?
//!     yes → tls.rs (PEM cert + key → rustls) → axum-server TLS listener
//!     no  → plain tokio TcpListener
//!     → http::GatewayServer
//! ```

pub mod tls;

pub use tls::load_tls_config;
