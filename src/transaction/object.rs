//! Object inputs and their resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transaction::intent::{Address, TransactionError, TransactionResult};

/// Digest length in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Content digest of an object version, base58 in text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectDigest(Vec<u8>);

impl ObjectDigest {
    pub fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ObjectDigest {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| TransactionError::InvalidDigest(format!("{s}: {e}")))?;
        if bytes.len() != DIGEST_LENGTH {
            return Err(TransactionError::InvalidDigest(format!(
                "{s}: expected {DIGEST_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

/// A specific version of an owned or immutable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: Address,
    pub version: u64,
    pub digest: ObjectDigest,
}

/// How a command reaches an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: Address,
        initial_shared_version: u64,
        mutable: bool,
    },
}

impl ObjectArg {
    pub fn id(&self) -> &Address {
        match self {
            ObjectArg::ImmOrOwnedObject(r) => &r.id,
            ObjectArg::SharedObject { id, .. } => id,
        }
    }
}

/// Looks up the current reference of an object by id.
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    async fn resolve_object(&self, id: &Address) -> TransactionResult<ObjectArg>;
}
