//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (wallet key)
//!     → wallet.rs (signing capability over exact sponsored bytes)
//!
//! Configured RPC URLs
//!     → client.rs (JSON-RPC with per-call timeout and failover)
//!     → finality.rs (poll by digest until a terminal state)
//!     → ExecutionReceipt
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or signatures
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod finality;
pub mod types;
pub mod wallet;

pub use client::ChainRpcClient;
pub use finality::{FinalityRpc, FinalityWaiter};
pub use types::{BlockchainError, BlockchainResult, ExecutionReceipt, ExecutionStatus, TransactionState};
pub use wallet::{LocalWallet, WalletError, WalletSigner};
