//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error response {code}: {message}")]
    RpcResponse { code: i64, message: String },

    /// No terminal state observed before the deadline.
    #[error("Transaction {digest} not final after {waited:?}")]
    FinalityTimeout { digest: String, waited: Duration },

    /// The node returned a payload we could not interpret.
    #[error("Unexpected RPC payload: {0}")]
    InvalidPayload(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Terminal execution status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure,
}

/// Outcome of a transaction once finality is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub digest: String,
    pub status: ExecutionStatus,
    pub failure_reason: Option<String>,
    /// Serialized effects, forwarded to the wallet for bookkeeping.
    #[serde(default)]
    pub raw_effects: Vec<u8>,
    /// Ids of objects created by the transaction.
    #[serde(default)]
    pub created_objects: Vec<String>,
}

impl ExecutionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// What the node currently knows about a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    /// Unknown to the node or not yet executed.
    Pending,
    /// Finality observed.
    Final(ExecutionReceipt),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::RpcResponse {
            code: -32602,
            message: "unknown digest".into(),
        };
        assert_eq!(err.to_string(), "RPC error response -32602: unknown digest");

        let err = BlockchainError::FinalityTimeout {
            digest: "d1".into(),
            waited: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("d1"));
    }

    #[test]
    fn test_receipt_success_flag() {
        let receipt = ExecutionReceipt {
            digest: "d1".into(),
            status: ExecutionStatus::Failure,
            failure_reason: Some("MoveAbort".into()),
            raw_effects: vec![],
            created_objects: vec![],
        };
        assert!(!receipt.is_success());
    }
}
