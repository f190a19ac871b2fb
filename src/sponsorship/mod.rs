//! Sponsorship subsystem.
//!
//! # Data Flow
//! ```text
//! UnsignedTransactionIntent
//!     → client.rs (sender assignment, kind bytes)
//!     → gateway.rs (POST /sponsor)           → SponsorshipGrant
//!     → WalletSigner (signs the grant bytes as received)
//!     → gateway.rs (POST /execute/{digest})  → executed digest
//!     → FinalityWaiter                        → ExecutionReceipt
//! ```
//!
//! # Invariants
//! - One intent produces exactly one sponsorship request per attempt
//! - A grant is never reused; a retry starts from a new sponsor call
//! - The execute digest is authoritative for finality
//! - No automatic retries

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::{SponsorshipClient, DEFAULT_FINALITY_TIMEOUT, DEFAULT_FLOW_TIMEOUT};
pub use error::{GatewayError, SponsorError};
pub use gateway::{HttpGateway, SponsorGateway};
pub use types::{
    ExecuteRequest, ExecutedTransaction, FlowStage, Network, SponsorOptions, SponsorshipGrant,
    SponsorshipRequest,
};
