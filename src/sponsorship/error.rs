//! Typed failures of the sponsored flow.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::sponsorship::types::FlowStage;
use crate::transaction::TransactionError;

/// Every way `sponsor_and_execute` can fail.
#[derive(Debug, Error)]
pub enum SponsorError {
    /// No active wallet identity.
    #[error("no wallet connected")]
    NotConnected,

    /// The intent could not be prepared.
    #[error("invalid transaction: {0}")]
    Validation(#[from] TransactionError),

    /// The provider declined to sponsor. `detail` is its error payload, untouched.
    #[error("sponsorship rejected with status {status}: {detail}")]
    SponsorRejected { status: u16, detail: Value },

    /// The key holder declined or did not answer.
    #[error("signature declined: {reason}")]
    SignatureDeclined { reason: String },

    /// The provider did not submit the transaction.
    #[error("execution rejected with status {status}: {detail}")]
    ExecutionRejected { status: u16, detail: Value },

    /// No terminal state was observed in time.
    #[error("transaction {digest} not final after {waited:?}")]
    FinalityTimeout { digest: String, waited: Duration },

    /// Executed but aborted on-chain.
    #[error("transaction {digest} failed on-chain: {reason}")]
    ChainFailure { digest: String, reason: String },

    /// Network-level failure or stage deadline.
    #[error("{stage} transport error: {message}")]
    Transport { stage: FlowStage, message: String },

    /// A success response that could not be decoded.
    #[error("{stage} returned a malformed response: {message}")]
    MalformedResponse { stage: FlowStage, message: String },
}

impl SponsorError {
    /// Short text suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            SponsorError::NotConnected => "Connect a wallet first.".to_string(),
            SponsorError::Validation(e) => format!("The transaction is invalid: {e}."),
            SponsorError::SponsorRejected { detail, .. } => {
                format!("Sponsorship was declined: {}", describe(detail))
            }
            SponsorError::SignatureDeclined { .. } => "The signature request was declined.".to_string(),
            SponsorError::ExecutionRejected { detail, .. } => {
                format!("The transaction could not be submitted: {}", describe(detail))
            }
            SponsorError::FinalityTimeout { .. } => {
                "The transaction was submitted but is not confirmed yet.".to_string()
            }
            SponsorError::ChainFailure { reason, .. } => format!("The transaction failed: {reason}"),
            SponsorError::Transport {
                stage: FlowStage::Resolve,
                ..
            } => "Could not look up the transaction's objects. Try again later.".to_string(),
            SponsorError::Transport { .. } | SponsorError::MalformedResponse { .. } => {
                "The sponsorship service is unavailable. Try again later.".to_string()
            }
        }
    }

    /// On-chain failure reason, set only for [`SponsorError::ChainFailure`].
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            SponsorError::ChainFailure { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Whether re-running the whole flow could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SponsorError::SignatureDeclined { .. }
                | SponsorError::Transport { .. }
                | SponsorError::FinalityTimeout { .. }
        )
    }
}

/// Pull a readable message out of a provider error payload.
fn describe(detail: &Value) -> String {
    let message = match detail {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("error")
            .or_else(|| map.get("errors").and_then(|e| e.get(0)))
            .or_else(|| map.get("message"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Object(inner) => inner
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| v.to_string()),
                other => other.to_string(),
            }),
        _ => None,
    };
    message.unwrap_or_else(|| detail.to_string())
}

/// Failure talking to the sponsorship gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider (relayed by the gateway) answered with an error status.
    #[error("rejected with status {status}")]
    Rejected { status: u16, body: Value },

    /// The gateway could not reach the provider.
    #[error("gateway could not reach the sponsorship provider")]
    ProviderUnreachable,

    /// The gateway itself could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Map into the flow error for `stage`.
    pub fn into_flow_error(self, stage: FlowStage) -> SponsorError {
        match self {
            GatewayError::Rejected { status, body } => match stage {
                FlowStage::Execute => SponsorError::ExecutionRejected { status, detail: body },
                _ => SponsorError::SponsorRejected { status, detail: body },
            },
            GatewayError::ProviderUnreachable => SponsorError::Transport {
                stage,
                message: "provider unreachable".to_string(),
            },
            GatewayError::Transport(message) => SponsorError::Transport { stage, message },
            GatewayError::Malformed(message) => SponsorError::MalformedResponse { stage, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_messages() {
        let err = SponsorError::SponsorRejected {
            status: 422,
            detail: json!({ "error": "target not allowed" }),
        };
        assert_eq!(err.user_message(), "Sponsorship was declined: target not allowed");

        let err = SponsorError::ExecutionRejected {
            status: 400,
            detail: json!({ "errors": [{ "code": "x", "message": "expired" }] }),
        };
        assert!(err.user_message().ends_with("expired"));
        assert!(err.failure_reason().is_none());
    }

    #[test]
    fn test_chain_failure_exposes_reason() {
        let err = SponsorError::ChainFailure {
            digest: "d1".into(),
            reason: "MoveAbort(3)".into(),
        };
        assert_eq!(err.failure_reason(), Some("MoveAbort(3)"));
        assert!(err.user_message().contains("MoveAbort(3)"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_lookup_failure_message() {
        let err = SponsorError::Transport {
            stage: FlowStage::Resolve,
            message: "connection refused".into(),
        };
        assert!(err.user_message().contains("look up"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_gateway_error_mapping() {
        let rejected = || GatewayError::Rejected {
            status: 429,
            body: json!({ "error": "rate limited" }),
        };
        assert!(matches!(
            rejected().into_flow_error(FlowStage::Sponsor),
            SponsorError::SponsorRejected { status: 429, .. }
        ));
        assert!(matches!(
            rejected().into_flow_error(FlowStage::Execute),
            SponsorError::ExecutionRejected { status: 429, .. }
        ));
        assert!(matches!(
            GatewayError::ProviderUnreachable.into_flow_error(FlowStage::Execute),
            SponsorError::Transport { stage: FlowStage::Execute, .. }
        ));
    }
}
