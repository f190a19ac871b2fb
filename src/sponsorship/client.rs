//! Orchestration of one gasless transaction.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{BlockchainError, ExecutionReceipt, FinalityWaiter, WalletSigner};
use crate::resilience::FlowBudget;
use crate::sponsorship::error::SponsorError;
use crate::sponsorship::gateway::SponsorGateway;
use crate::sponsorship::types::{FlowStage, SponsorOptions, SponsorshipRequest};
use crate::transaction::{
    ObjectResolver, SponsoredTransaction, TransactionError, UnsignedTransactionIntent,
};

pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_FINALITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives resolve → sponsor → sign → execute → finality for one intent at a time.
///
/// Holds no per-flow state. Every call requests a fresh sponsorship, so a
/// failed attempt is retried by simply calling again.
#[derive(Clone)]
pub struct SponsorshipClient {
    gateway: Arc<dyn SponsorGateway>,
    wallet: Arc<dyn WalletSigner>,
    finality: FinalityWaiter,
    objects: Option<Arc<dyn ObjectResolver>>,
    flow_timeout: Duration,
    finality_timeout: Duration,
}

impl SponsorshipClient {
    pub fn new(
        gateway: Arc<dyn SponsorGateway>,
        wallet: Arc<dyn WalletSigner>,
        finality: FinalityWaiter,
    ) -> Self {
        Self {
            gateway,
            wallet,
            finality,
            objects: None,
            flow_timeout: DEFAULT_FLOW_TIMEOUT,
            finality_timeout: DEFAULT_FINALITY_TIMEOUT,
        }
    }

    /// Look up references for objects the intent names by id only.
    pub fn with_object_resolver(mut self, resolver: Arc<dyn ObjectResolver>) -> Self {
        self.objects = Some(resolver);
        self
    }

    /// Default budgets used when [`SponsorOptions`] leaves them unset.
    pub fn with_timeouts(mut self, flow_timeout: Duration, finality_timeout: Duration) -> Self {
        self.flow_timeout = flow_timeout;
        self.finality_timeout = finality_timeout;
        self
    }

    /// Run the flow and return the executed digest.
    pub async fn sponsor_and_execute(
        &self,
        intent: UnsignedTransactionIntent,
        options: &SponsorOptions,
    ) -> Result<String, SponsorError> {
        self.sponsor_and_execute_with_receipt(intent, options)
            .await
            .map(|receipt| receipt.digest)
    }

    /// Run the flow and return the full receipt (created objects, raw effects).
    pub async fn sponsor_and_execute_with_receipt(
        &self,
        mut intent: UnsignedTransactionIntent,
        options: &SponsorOptions,
    ) -> Result<ExecutionReceipt, SponsorError> {
        let sender = self
            .wallet
            .current_address()
            .ok_or(SponsorError::NotConnected)?;
        intent.set_sender(&sender)?;

        if let Some(objects) = &self.objects {
            intent
                .resolve_objects(objects.as_ref())
                .await
                .map_err(|e| match e {
                    TransactionError::ObjectResolution { .. } => SponsorError::Transport {
                        stage: FlowStage::Resolve,
                        message: e.to_string(),
                    },
                    other => SponsorError::Validation(other),
                })?;
        }

        let kind_bytes = intent.kind_bytes()?;
        warn_on_unlisted_targets(&intent, options);

        let request = SponsorshipRequest {
            network: Some(options.network),
            transaction_block_kind_bytes: BASE64.encode(kind_bytes),
            sender,
            allowed_move_call_targets: options.allowed_call_targets.clone(),
            allowed_addresses: options.allowed_counterparties.clone(),
        };

        // The signing prompt is not charged against this budget.
        let mut budget = FlowBudget::new(options.flow_timeout.unwrap_or(self.flow_timeout));

        let grant = budget
            .run(self.gateway.sponsor(&request))
            .await
            .map_err(|_| stage_timeout(FlowStage::Sponsor))?
            .map_err(|e| e.into_flow_error(FlowStage::Sponsor))?;
        tracing::debug!(digest = %grant.digest, network = %options.network, "Sponsorship granted");

        let transaction =
            SponsoredTransaction::from_base64(&grant.bytes).map_err(|e| SponsorError::MalformedResponse {
                stage: FlowStage::Sponsor,
                message: e.to_string(),
            })?;

        let signature = self
            .wallet
            .sign_transaction(&transaction, &options.chain())
            .await
            .map_err(|e| SponsorError::SignatureDeclined {
                reason: e.to_string(),
            })?;
        tracing::debug!(digest = %grant.digest, "Sponsored transaction signed");

        let executed = budget
            .run(self.gateway.execute(&grant.digest, &signature))
            .await
            .map_err(|_| stage_timeout(FlowStage::Execute))?
            .map_err(|e| e.into_flow_error(FlowStage::Execute))?;

        if executed.digest != grant.digest {
            tracing::warn!(
                sponsor_digest = %grant.digest,
                execute_digest = %executed.digest,
                "Execute digest differs from sponsor digest, following execute digest"
            );
        }

        let wait = budget.cap(options.finality_timeout.unwrap_or(self.finality_timeout));
        let receipt = match self.finality.wait(&executed.digest, wait).await {
            Ok(receipt) => receipt,
            Err(BlockchainError::FinalityTimeout { digest, waited }) => {
                return Err(SponsorError::FinalityTimeout { digest, waited })
            }
            Err(e) => {
                return Err(SponsorError::Transport {
                    stage: FlowStage::Finality,
                    message: e.to_string(),
                })
            }
        };

        if let Err(e) = self
            .wallet
            .report_effects(&receipt.digest, &receipt.raw_effects)
            .await
        {
            tracing::warn!(digest = %receipt.digest, error = %e, "Failed to report effects to wallet");
        }

        if !receipt.is_success() {
            return Err(SponsorError::ChainFailure {
                digest: receipt.digest.clone(),
                reason: receipt
                    .failure_reason
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
            });
        }

        tracing::info!(digest = %receipt.digest, network = %options.network, "Sponsored transaction final");
        Ok(receipt)
    }
}

fn stage_timeout(stage: FlowStage) -> SponsorError {
    SponsorError::Transport {
        stage,
        message: "flow deadline exceeded".to_string(),
    }
}

/// The provider decides; this only makes a doomed request visible in the logs.
fn warn_on_unlisted_targets(intent: &UnsignedTransactionIntent, options: &SponsorOptions) {
    let Some(allowed) = &options.allowed_call_targets else {
        return;
    };
    for target in intent.call_targets() {
        if !allowed.iter().any(|a| target.matches(a)) {
            tracing::warn!(target = %target, "Call target is not in the allow-list");
        }
    }
}
