//! Sponsorship data model and wire types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Target network of a sponsored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Devnet,
    Mainnet,
    Localnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Mainnet => "mainnet",
            Network::Localnet => "localnet",
        }
    }

    /// Chain identifier handed to the signer, e.g. `sui:testnet`.
    pub fn default_chain(&self) -> String {
        format!("sui:{}", self.as_str())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "mainnet" => Ok(Network::Mainnet),
            "localnet" => Ok(Network::Localnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// Body of `POST /sponsor`, both client → gateway and gateway → provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorshipRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    /// Base64 of the intent's kind bytes.
    pub transaction_block_kind_bytes: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_move_call_targets: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_addresses: Option<BTreeSet<String>>,
}

/// The provider's answer to a sponsor request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorshipGrant {
    pub digest: String,
    /// Base64 of the sponsor-signed transaction, passed to the signer untouched.
    pub bytes: String,
}

/// Body of `POST /execute/{digest}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub signature: String,
}

/// The provider's answer to an execute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedTransaction {
    pub digest: String,
}

/// Per-call options for [`crate::sponsorship::SponsorshipClient::sponsor_and_execute`].
#[derive(Debug, Clone, Default)]
pub struct SponsorOptions {
    pub network: Network,
    pub allowed_call_targets: Option<BTreeSet<String>>,
    pub allowed_counterparties: Option<BTreeSet<String>>,
    /// Overrides the `sui:<network>` chain id handed to the signer.
    pub chain_id: Option<String>,
    /// End-to-end budget for the network stages. `None` uses the client default.
    pub flow_timeout: Option<Duration>,
    pub finality_timeout: Option<Duration>,
}

impl SponsorOptions {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn allow_target(mut self, target: impl Into<String>) -> Self {
        self.allowed_call_targets
            .get_or_insert_with(BTreeSet::new)
            .insert(target.into());
        self
    }

    pub fn allow_address(mut self, address: impl Into<String>) -> Self {
        self.allowed_counterparties
            .get_or_insert_with(BTreeSet::new)
            .insert(address.into());
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain_id = Some(chain.into());
        self
    }

    pub fn with_flow_timeout(mut self, timeout: Duration) -> Self {
        self.flow_timeout = Some(timeout);
        self
    }

    pub fn with_finality_timeout(mut self, timeout: Duration) -> Self {
        self.finality_timeout = Some(timeout);
        self
    }

    /// Chain the signer is asked to sign for.
    pub fn chain(&self) -> String {
        self.chain_id
            .clone()
            .unwrap_or_else(|| self.network.default_chain())
    }
}

/// Stage of the sponsored flow, used to tag failures and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    /// Looking up object references for the inputs.
    Resolve,
    Sponsor,
    Execute,
    Finality,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStage::Resolve => "resolve",
            FlowStage::Sponsor => "sponsor",
            FlowStage::Execute => "execute",
            FlowStage::Finality => "finality",
        };
        f.write_str(s)
    }
}
