//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Sponsorship flow:
//!     → timeouts.rs (one budget shared by sponsor, execute and finality stages)
//!     → backoff.rs (spacing between finality polls)
//! ```
//!
//! The core performs no automatic retries; a failed flow is re-run by the caller
//! from a fresh sponsorship.

pub mod backoff;
pub mod timeouts;

pub use backoff::calculate_backoff;
pub use timeouts::FlowBudget;
