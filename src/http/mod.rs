//! Sponsorship gateway HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (request id, trace span, body limit)
//!     → deadline.rs (marked 500 when the whole request overruns)
//!     → sponsor.rs / execute.rs (local validation, default network)
//!     → provider::ProviderClient (credential attached)
//!     → response.rs (provider error relayed verbatim, or `data` unwrapped,
//!                    or marked 500 when the provider gave no verdict)
//!     → Send to client
//! ```
//!
//! The handlers hold no state between requests.

pub mod deadline;
pub mod execute;
pub mod health;
pub mod request;
pub mod response;
pub mod server;
pub mod sponsor;

pub use crate::provider::RELAY_INVALID_RESPONSE;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{RelayError, RELAY_ERROR_HEADER};
pub use server::{AppState, GatewayServer, ServerError};
