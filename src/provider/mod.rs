//! Sponsorship provider subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler (validated request, request id)
//!     → client.rs (bearer credential, POST to provider)
//!     → ProviderReply (status, content type, raw body)
//!     → handler relays errors verbatim or unwraps `data`
//! ```

pub mod client;
pub mod types;

pub use client::{ProviderClient, REQUEST_ID_HEADER};
pub use types::{ProviderError, ProviderReply, RELAY_INVALID_RESPONSE, RELAY_UNREACHABLE};
