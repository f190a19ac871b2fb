//! Pure argument encoding.
//!
//! Each value is written with `bcs`, so integers are little-endian, booleans
//! take one byte, addresses are 32 raw bytes and vectors carry a ULEB128
//! length prefix.

use serde::{Deserialize, Serialize};

use crate::transaction::intent::{Address, TransactionError, TransactionResult};

/// A typed value passed by value to a move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PureValue {
    U8(u8),
    U64(u64),
    Bool(bool),
    Address(String),
    /// UTF-8 text, encoded as `vector<u8>`.
    String(String),
    Bytes(Vec<u8>),
    /// `vector<vector<u8>>`, e.g. the option labels of a proposal.
    BytesVector(Vec<Vec<u8>>),
}

impl PureValue {
    /// Encode the value into its on-chain byte layout.
    pub fn encode(&self) -> TransactionResult<Vec<u8>> {
        let encoded = match self {
            PureValue::U8(v) => bcs::to_bytes(v),
            PureValue::U64(v) => bcs::to_bytes(v),
            PureValue::Bool(v) => bcs::to_bytes(v),
            PureValue::Address(addr) => bcs::to_bytes(&addr.parse::<Address>()?),
            PureValue::String(s) => bcs::to_bytes(s),
            PureValue::Bytes(b) => bcs::to_bytes(b),
            PureValue::BytesVector(items) => bcs::to_bytes(items),
        };
        encoded.map_err(|e| TransactionError::Serialization(e.to_string()))
    }
}
