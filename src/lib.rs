//! Gasless transaction sponsorship: builder, client flow, gateway relay and finality.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod provider;
pub mod resilience;
pub mod sponsorship;
pub mod transaction;

pub use config::schema::RelayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use sponsorship::{SponsorError, SponsorOptions, SponsorshipClient};
