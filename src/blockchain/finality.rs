//! Finality waiting.
//!
//! # Responsibilities
//! - Poll the RPC by digest until a terminal status is reported
//! - Back off between polls (exponential, jittered, capped)
//! - Give up with `FinalityTimeout` at the deadline
//!
//! There are no retries of the wait itself: one call, one deadline.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ExecutionReceipt, ExecutionStatus, TransactionState,
};
use crate::resilience::backoff::calculate_backoff;

/// Read access to transaction outcomes.
#[async_trait]
pub trait FinalityRpc: Send + Sync {
    /// Current state of `digest`. Errors are transient; the waiter keeps polling.
    async fn transaction_state(&self, digest: &str) -> BlockchainResult<TransactionState>;
}

/// Waits for a digest to reach a terminal state.
#[derive(Clone)]
pub struct FinalityWaiter {
    rpc: Arc<dyn FinalityRpc>,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl FinalityWaiter {
    pub fn new(rpc: Arc<dyn FinalityRpc>) -> Self {
        Self {
            rpc,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }

    /// Set the polling backoff bounds.
    pub fn with_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms.max(1);
        self.max_delay_ms = max_delay_ms.max(self.base_delay_ms);
        self
    }

    /// Block until `digest` is final or `wait` elapses.
    pub async fn wait(&self, digest: &str, wait: Duration) -> BlockchainResult<ExecutionReceipt> {
        let started = Instant::now();

        let result = timeout(wait, async {
            let mut attempt = 0u32;
            loop {
                match self.rpc.transaction_state(digest).await {
                    Ok(TransactionState::Final(receipt)) => return receipt,
                    Ok(TransactionState::Pending) => {
                        tracing::debug!(digest = %digest, attempt, "Transaction pending");
                    }
                    Err(e) => {
                        tracing::warn!(digest = %digest, attempt, error = %e, "Finality poll failed");
                    }
                }

                attempt = attempt.saturating_add(1);
                sleep(calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)).await;
            }
        })
        .await;

        match result {
            Ok(receipt) => {
                tracing::info!(
                    digest = %digest,
                    status = ?receipt.status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Finality observed"
                );
                Ok(receipt)
            }
            Err(_) => Err(BlockchainError::FinalityTimeout {
                digest: digest.to_string(),
                waited: started.elapsed(),
            }),
        }
    }

    /// Query the state once without waiting.
    pub async fn check(&self, digest: &str) -> BlockchainResult<TransactionState> {
        self.rpc.transaction_state(digest).await
    }
}

/// Interpret a `sui_getTransactionBlock` result.
pub fn parse_transaction_block(digest: &str, block: &Value) -> BlockchainResult<TransactionState> {
    let Some(status) = block.pointer("/effects/status") else {
        return Ok(TransactionState::Pending);
    };

    let (status, failure_reason) = match status.get("status").and_then(Value::as_str) {
        Some("success") => (ExecutionStatus::Success, None),
        Some("failure") => (
            ExecutionStatus::Failure,
            Some(
                status
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown failure")
                    .to_string(),
            ),
        ),
        other => {
            return Err(BlockchainError::InvalidPayload(format!(
                "unknown execution status {:?}",
                other
            )))
        }
    };

    let raw_effects = block
        .get("rawEffects")
        .and_then(Value::as_array)
        .map(|bytes| {
            bytes
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect()
        })
        .unwrap_or_default();

    let created_objects = block
        .get("objectChanges")
        .and_then(Value::as_array)
        .map(|changes| {
            changes
                .iter()
                .filter(|c| c.get("type").and_then(Value::as_str) == Some("created"))
                .filter_map(|c| c.get("objectId").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let digest = block
        .get("digest")
        .and_then(Value::as_str)
        .unwrap_or(digest)
        .to_string();

    Ok(TransactionState::Final(ExecutionReceipt {
        digest,
        status,
        failure_reason,
        raw_effects,
        created_objects,
    }))
}
