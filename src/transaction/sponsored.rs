//! Sponsored transaction bytes as returned by the sponsor.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::transaction::intent::{TransactionError, TransactionResult};

/// A fully-formed transaction (intent + fee payer data) awaiting the sender's signature.
///
/// The bytes are kept exactly as received; nothing here re-encodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsoredTransaction {
    encoded: String,
    bytes: Vec<u8>,
}

impl SponsoredTransaction {
    /// Decode base64 transaction bytes.
    pub fn from_base64(encoded: &str) -> TransactionResult<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| TransactionError::Serialization(format!("invalid transaction bytes: {e}")))?;
        if bytes.is_empty() {
            return Err(TransactionError::Serialization(
                "empty transaction bytes".to_string(),
            ));
        }
        Ok(Self {
            encoded: encoded.to_string(),
            bytes,
        })
    }

    /// The decoded bytes the signature must cover.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The base64 form, identical to what the sponsor sent.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}
