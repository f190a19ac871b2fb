//! JSON-RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to one or more JSON-RPC endpoints
//! - Query transaction blocks by digest
//! - Handle timeouts and network errors by moving to the next endpoint
//! - Surface node-level error responses without failing over
//! - Resolve object ids to the references a transaction needs

use alloy::rpc::client::{ClientBuilder, RpcClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::finality::{parse_transaction_block, FinalityRpc};
use crate::blockchain::types::{BlockchainError, BlockchainResult, TransactionState};
use crate::config::ClientConfig;
use crate::transaction::{
    Address, ObjectArg, ObjectDigest, ObjectRef, ObjectResolver, TransactionError, TransactionResult,
};

/// Method used to look up an executed transaction.
pub const GET_TRANSACTION_METHOD: &str = "sui_getTransactionBlock";

/// Method used to look up an object's current reference.
pub const GET_OBJECT_METHOD: &str = "sui_getObject";

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainRpcClient {
    /// Endpoints in priority order (primary first).
    endpoints: Vec<(String, RpcClient)>,
    /// Per-call timeout.
    timeout_duration: Duration,
}

impl ChainRpcClient {
    /// Create a client for the configured endpoints.
    ///
    /// The first URL must parse; later ones are skipped with a warning when invalid.
    pub fn new(config: &ClientConfig) -> BlockchainResult<Self> {
        let mut endpoints = Vec::new();

        for (i, url_str) in config.rpc_urls.iter().enumerate() {
            match url_str.parse::<url::Url>() {
                Ok(url) => {
                    let client = ClientBuilder::default().http(url);
                    endpoints.push((url_str.clone(), client));
                }
                Err(e) if i == 0 => {
                    return Err(BlockchainError::Rpc(format!(
                        "Invalid RPC URL '{}': {}",
                        url_str, e
                    )));
                }
                Err(_) => {
                    tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
                }
            }
        }

        if endpoints.is_empty() {
            return Err(BlockchainError::Rpc("No RPC URL configured".to_string()));
        }

        tracing::info!(
            primary = %endpoints[0].0,
            failovers = endpoints.len() - 1,
            "Chain RPC client initialized"
        );

        Ok(Self {
            endpoints,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    /// Issue a JSON-RPC call, failing over on transport errors and timeouts.
    pub async fn call(&self, method: &'static str, params: Value) -> BlockchainResult<Value> {
        for (i, (url, client)) in self.endpoints.iter().enumerate() {
            let fut = client.request::<Value, Value>(method, params.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        return Err(BlockchainError::RpcResponse {
                            code: payload.code,
                            message: payload.message.to_string(),
                        });
                    }
                    tracing::warn!(provider_idx = i, url = %url, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, url = %url, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Fetch a transaction block with effects, raw effects and object changes.
    pub async fn get_transaction_block(&self, digest: &str) -> BlockchainResult<Value> {
        let params = json!([
            digest,
            {
                "showEffects": true,
                "showRawEffects": true,
                "showObjectChanges": true
            }
        ]);
        self.call(GET_TRANSACTION_METHOD, params).await
    }

    /// Fetch an object with its owner.
    pub async fn get_object(&self, id: &Address) -> BlockchainResult<Value> {
        let params = json!([id.to_string(), { "showOwner": true }]);
        self.call(GET_OBJECT_METHOD, params).await
    }

    /// Number of configured endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

#[async_trait]
impl FinalityRpc for ChainRpcClient {
    async fn transaction_state(&self, digest: &str) -> BlockchainResult<TransactionState> {
        match self.get_transaction_block(digest).await {
            Ok(block) => parse_transaction_block(digest, &block),
            // Unknown digests come back as error responses until the node indexes them.
            Err(BlockchainError::RpcResponse { code, message }) => {
                tracing::debug!(digest = %digest, code, message = %message, "Transaction not yet known");
                Ok(TransactionState::Pending)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ObjectResolver for ChainRpcClient {
    async fn resolve_object(&self, id: &Address) -> TransactionResult<ObjectArg> {
        let response = self
            .get_object(id)
            .await
            .map_err(|e| TransactionError::ObjectResolution {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        let arg = parse_object(id, &response)?;
        tracing::debug!(object = %id, shared = matches!(arg, ObjectArg::SharedObject { .. }), "Object resolved");
        Ok(arg)
    }
}

/// Turn a `sui_getObject` result into the argument a command uses.
///
/// Shared objects are taken mutably; everything else is referenced at its
/// current version and digest.
pub fn parse_object(id: &Address, response: &Value) -> TransactionResult<ObjectArg> {
    let failed = |reason: String| TransactionError::ObjectResolution {
        id: id.to_string(),
        reason,
    };

    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
        return Err(failed(format!("node reported {code}")));
    }
    let data = response
        .get("data")
        .ok_or_else(|| failed("response has no data".to_string()))?;

    if let Some(shared) = data.get("owner").and_then(|o| o.get("Shared")) {
        let initial_shared_version = shared
            .get("initial_shared_version")
            .and_then(as_u64)
            .ok_or_else(|| failed("shared owner without initial version".to_string()))?;
        return Ok(ObjectArg::SharedObject {
            id: *id,
            initial_shared_version,
            mutable: true,
        });
    }

    let version = data
        .get("version")
        .and_then(as_u64)
        .ok_or_else(|| failed("missing version".to_string()))?;
    let digest: ObjectDigest = data
        .get("digest")
        .and_then(Value::as_str)
        .ok_or_else(|| failed("missing digest".to_string()))?
        .parse()?;

    Ok(ObjectArg::ImmOrOwnedObject(ObjectRef {
        id: *id,
        version,
        digest,
    }))
}

/// Versions arrive as decimal strings or plain numbers depending on the node.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        other => other.as_u64(),
    }
}

impl std::fmt::Debug for ChainRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let urls: Vec<&str> = self.endpoints.iter().map(|(u, _)| u.as_str()).collect();
        f.debug_struct("ChainRpcClient")
            .field("endpoints", &urls)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(urls: &[&str]) -> ClientConfig {
        ClientConfig {
            rpc_urls: urls.iter().map(|u| u.to_string()).collect(),
            rpc_timeout_secs: 1,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_invalid_primary_rejected() {
        let result = ChainRpcClient::new(&test_config(&["not a url"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_failover_skipped() {
        let client =
            ChainRpcClient::new(&test_config(&["http://127.0.0.1:9000", "::bad::"])).unwrap();
        assert_eq!(client.endpoint_count(), 1);
    }

    #[test]
    fn test_no_urls_rejected() {
        assert!(ChainRpcClient::new(&test_config(&[])).is_err());
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        // Bind then drop to get ports nobody listens on.
        let a = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let b = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = ChainRpcClient::new(&test_config(&[
            &format!("http://{a}"),
            &format!("http://{b}"),
        ]))
        .unwrap();

        let result = client.get_transaction_block("d1").await;
        assert!(result.unwrap_err().to_string().contains("All RPC providers failed"));
    }

    fn faucet() -> Address {
        "0xf0".parse().unwrap()
    }

    #[test]
    fn test_shared_object_parsed() {
        let response = json!({
            "data": {
                "objectId": faucet().to_string(),
                "version": "40",
                "digest": ObjectDigest::new([3u8; 32]).to_string(),
                "owner": { "Shared": { "initial_shared_version": 7 } }
            }
        });
        assert_eq!(
            parse_object(&faucet(), &response).unwrap(),
            ObjectArg::SharedObject {
                id: faucet(),
                initial_shared_version: 7,
                mutable: true,
            }
        );
    }

    #[test]
    fn test_owned_and_immutable_objects_parsed() {
        let digest = ObjectDigest::new([3u8; 32]);
        for owner in [json!({ "AddressOwner": "0xabc" }), json!("Immutable")] {
            let response = json!({
                "data": { "version": 12, "digest": digest.to_string(), "owner": owner }
            });
            assert_eq!(
                parse_object(&faucet(), &response).unwrap(),
                ObjectArg::ImmOrOwnedObject(ObjectRef {
                    id: faucet(),
                    version: 12,
                    digest: digest.clone(),
                })
            );
        }
    }

    #[test]
    fn test_missing_object_rejected() {
        let response = json!({ "error": { "code": "notExists", "object_id": "0xf0" } });
        let err = parse_object(&faucet(), &response).unwrap_err();
        assert!(matches!(err, TransactionError::ObjectResolution { ref reason, .. } if reason.contains("notExists")));

        let response = json!({ "data": { "version": "x", "digest": "abc" } });
        assert!(parse_object(&faucet(), &response).is_err());
    }

    #[tokio::test]
    async fn test_resolver_unreachable_is_resolution_error() {
        let a = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = ChainRpcClient::new(&test_config(&[&format!("http://{a}")])).unwrap();
        let err = client.resolve_object(&faucet()).await.unwrap_err();
        assert!(matches!(err, TransactionError::ObjectResolution { .. }));
    }
}
