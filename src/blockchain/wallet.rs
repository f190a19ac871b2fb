//! Wallet signing capability.
//!
//! # Security
//! - The key is read from `SPONSOR_WALLET_PRIVATE_KEY` only and never logged
//! - A signature covers the exact bytes handed to the wallet, nothing re-encoded

use alloy::primitives::Signature;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::transaction::SponsoredTransaction;

pub const PRIVATE_KEY_ENV_VAR: &str = "SPONSOR_WALLET_PRIVATE_KEY";

/// Errors from the signing capability.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The key holder declined the request.
    #[error("Signing request rejected: {0}")]
    Rejected(String),

    /// The key holder did not answer in time.
    #[error("Signing request timed out")]
    TimedOut,

    /// The wallet is not configured for the requested chain.
    #[error("Chain {requested} not supported (wallet is on {configured})")]
    UnsupportedChain { requested: String, configured: String },

    #[error("Invalid private key format: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// Signature could not be decoded or recovered.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// The caller's identity and signing capability.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the connected account, if any.
    fn current_address(&self) -> Option<String>;

    /// Sign the sponsored transaction bytes for `chain`; returns the encoded signature.
    async fn sign_transaction(
        &self,
        transaction: &SponsoredTransaction,
        chain: &str,
    ) -> Result<String, WalletError>;

    /// Report execution effects back to the wallet. Best-effort.
    async fn report_effects(&self, _digest: &str, _raw_effects: &[u8]) -> Result<(), WalletError> {
        Ok(())
    }
}

/// Wallet backed by a local secp256k1 key.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    /// Chain identifier this wallet signs for, e.g. `sui:testnet`.
    chain: String,
}

impl LocalWallet {
    /// Parse a hex secp256k1 key, with or without `0x`.
    pub fn from_private_key(private_key_hex: &str, chain: &str) -> Result<Self, WalletError> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain = %chain,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            chain: chain.to_string(),
        })
    }

    /// Wallet from `SPONSOR_WALLET_PRIVATE_KEY`.
    pub fn from_env(chain: &str) -> Result<Self, WalletError> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            WalletError::InvalidKey(format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
        })?;

        Self::from_private_key(&private_key, chain)
    }

    /// Lowercase hex address of the key.
    pub fn address(&self) -> String {
        self.signer.address().to_string().to_lowercase()
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Sign arbitrary bytes and return the base64-encoded 65-byte signature.
    pub async fn sign_bytes(&self, bytes: &[u8]) -> Result<String, WalletError> {
        let signature = self
            .signer
            .sign_message(bytes)
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(BASE64.encode(signature.as_bytes()))
    }

    /// Recover the lowercase hex address that signed exactly `bytes`.
    pub fn recover_signer(bytes: &[u8], signature_b64: &str) -> Result<String, WalletError> {
        let raw = BASE64
            .decode(signature_b64)
            .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        let signature = Signature::try_from(raw.as_slice())
            .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        let address = signature
            .recover_address_from_msg(bytes)
            .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        Ok(address.to_string().to_lowercase())
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn current_address(&self) -> Option<String> {
        Some(self.address())
    }

    async fn sign_transaction(
        &self,
        transaction: &SponsoredTransaction,
        chain: &str,
    ) -> Result<String, WalletError> {
        if chain != self.chain {
            return Err(WalletError::UnsupportedChain {
                requested: chain.to_string(),
                configured: self.chain.clone(),
            });
        }
        self.sign_bytes(transaction.as_bytes()).await
    }

    async fn report_effects(&self, digest: &str, raw_effects: &[u8]) -> Result<(), WalletError> {
        tracing::debug!(digest = %digest, effects_len = raw_effects.len(), "Effects reported to wallet");
        Ok(())
    }
}
