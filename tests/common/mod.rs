//! Shared utilities for integration tests: mock upstreams, a gateway launcher
//! and in-memory doubles for the wallet, gateway and chain.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use sponsor_relay::blockchain::{
    BlockchainResult, ExecutionReceipt, ExecutionStatus, FinalityRpc, FinalityWaiter, LocalWallet,
    TransactionState, WalletError, WalletSigner,
};
use sponsor_relay::config::RelayConfig;
use sponsor_relay::lifecycle::Shutdown;
use sponsor_relay::sponsorship::{
    ExecutedTransaction, GatewayError, HttpGateway, SponsorGateway, SponsorshipClient,
    SponsorshipGrant, SponsorshipRequest,
};
use sponsor_relay::transaction::{
    Address, Command, ObjectArg, ObjectResolver, SponsoredTransaction, TransactionKind,
    TransactionResult,
};
use sponsor_relay::GatewayServer;

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const TEST_API_KEY: &str = "test-provider-key";

// ---------------------------------------------------------------------------
// Raw TCP upstream
// ---------------------------------------------------------------------------

/// One request seen by the programmable backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Start a backend that answers every request with `f(request) -> (status, body)`.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, Captured)
where
    F: Fn(&CapturedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let seen = captured.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, body) = f(&request);
                seen.lock().unwrap().push(request);

                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, captured)
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        method,
        path,
        headers,
        body: buf[header_end..].to_vec(),
    })
}

/// A backend that accepts connections, reads the request and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                while let Ok(n) = socket.read(&mut chunk).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });
    addr
}

/// An address with nothing listening on it.
pub fn unreachable_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

pub fn gateway_config(provider_addr: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.provider.base_url = format!("http://{}", provider_addr);
    config.provider.api_key = TEST_API_KEY.to_string();
    config.provider.timeout_secs = 5;
    config.provider.connect_timeout_secs = 2;
    config
}

/// Serve a gateway on an ephemeral port. Dropping the returned `Shutdown` does
/// not stop it; call `trigger`.
pub async fn start_gateway(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let server = GatewayServer::new(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Mock sponsorship provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MockProviderOptions {
    /// Flip a bit of the bytes handed to the client; the stored original stays intact.
    pub tamper_bytes: bool,
    /// Every executed transaction aborts on-chain with this reason.
    pub abort_reason: Option<String>,
}

struct PendingGrant {
    sender: String,
    bytes: Vec<u8>,
}

/// Provider double that issues grants, checks signatures over the exact
/// granted bytes, and records what happened.
pub struct MockProviderState {
    options: MockProviderOptions,
    next_id: AtomicU32,
    grants: Mutex<HashMap<String, PendingGrant>>,
    pub sponsor_calls: Mutex<Vec<Value>>,
    pub execute_calls: Mutex<Vec<String>>,
    executed: Mutex<HashMap<String, Option<String>>>,
}

impl MockProviderState {
    pub fn sponsor_count(&self) -> usize {
        self.sponsor_calls.lock().unwrap().len()
    }

    pub fn executed_digests(&self) -> Vec<String> {
        self.execute_calls.lock().unwrap().clone()
    }
}

pub struct MockProvider {
    pub addr: SocketAddr,
    pub state: Arc<MockProviderState>,
}

impl MockProvider {
    pub async fn start(options: MockProviderOptions) -> Self {
        let state = Arc::new(MockProviderState {
            options,
            next_id: AtomicU32::new(0),
            grants: Mutex::new(HashMap::new()),
            sponsor_calls: Mutex::new(Vec::new()),
            execute_calls: Mutex::new(Vec::new()),
            executed: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/v1/transaction-blocks/sponsor", post(mock_sponsor))
            .route("/v1/transaction-blocks/sponsor/{digest}", post(mock_execute))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Chain view of what this provider executed.
    pub fn finality(&self) -> FinalityWaiter {
        FinalityWaiter::new(Arc::new(MockChain(self.state.clone()))).with_backoff(5, 20)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TEST_API_KEY))
        .unwrap_or(false)
}

fn reject(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn mock_sponsor(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, json!({ "error": "missing credential" }));
    }
    state.sponsor_calls.lock().unwrap().push(body.clone());

    let sender = body["sender"].as_str().unwrap_or_default().to_string();
    let kind_bytes = body["transactionBlockKindBytes"]
        .as_str()
        .and_then(|b| BASE64.decode(b).ok())
        .unwrap_or_default();
    let Ok(kind) = TransactionKind::from_bcs(&kind_bytes) else {
        return reject(StatusCode::BAD_REQUEST, json!({ "error": "invalid transaction kind" }));
    };

    if let Some(allowed) = body.get("allowedMoveCallTargets").and_then(Value::as_array) {
        for command in kind.commands() {
            if let Command::MoveCall(call) = command {
                let target = call.target();
                let listed = allowed
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|a| target.matches(a));
                if !listed {
                    return reject(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        json!({ "error": "target not allowed", "target": target.to_string() }),
                    );
                }
            }
        }
    }

    let digest = format!("d{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    let mut bytes = format!("sponsored:{}:", digest).into_bytes();
    bytes.extend_from_slice(&kind_bytes);

    let mut sent = bytes.clone();
    if state.options.tamper_bytes {
        sent[0] ^= 0x01;
    }
    state
        .grants
        .lock()
        .unwrap()
        .insert(digest.clone(), PendingGrant { sender, bytes });

    Json(json!({ "data": { "digest": digest, "bytes": BASE64.encode(sent) } })).into_response()
}

async fn mock_execute(
    State(state): State<Arc<MockProviderState>>,
    Path(digest): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, json!({ "error": "missing credential" }));
    }
    state.execute_calls.lock().unwrap().push(digest.clone());

    let Some(grant) = state.grants.lock().unwrap().remove(&digest) else {
        return reject(StatusCode::NOT_FOUND, json!({ "error": "unknown or consumed digest" }));
    };

    let signature = body["signature"].as_str().unwrap_or_default();
    match LocalWallet::recover_signer(&grant.bytes, signature) {
        Ok(signer) if signer == grant.sender.to_lowercase() => {}
        _ => return reject(StatusCode::BAD_REQUEST, json!({ "error": "invalid signature" })),
    }

    state
        .executed
        .lock()
        .unwrap()
        .insert(digest.clone(), state.options.abort_reason.clone());
    Json(json!({ "data": { "digest": digest } })).into_response()
}

struct MockChain(Arc<MockProviderState>);

#[async_trait]
impl FinalityRpc for MockChain {
    async fn transaction_state(&self, digest: &str) -> BlockchainResult<TransactionState> {
        let executed = self.0.executed.lock().unwrap();
        Ok(match executed.get(digest) {
            None => TransactionState::Pending,
            Some(abort) => TransactionState::Final(receipt(digest, abort.clone())),
        })
    }
}

pub fn receipt(digest: &str, abort: Option<String>) -> ExecutionReceipt {
    ExecutionReceipt {
        digest: digest.to_string(),
        status: if abort.is_some() {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Success
        },
        failure_reason: abort,
        raw_effects: vec![1, 2, 3],
        created_objects: vec![],
    }
}

/// Client wired through a real gateway to `provider`.
pub async fn client_via_gateway(
    provider: &MockProvider,
    wallet: Arc<dyn WalletSigner>,
) -> (SponsorshipClient, Shutdown) {
    let (gateway_addr, shutdown) = start_gateway(gateway_config(provider.addr)).await;
    let gateway = HttpGateway::new(&format!("http://{}", gateway_addr), Duration::from_secs(5)).unwrap();
    let client = SponsorshipClient::new(Arc::new(gateway), wallet, provider.finality())
        .with_object_resolver(Arc::new(StaticObjects));
    (client, shutdown)
}

// ---------------------------------------------------------------------------
// In-memory doubles
// ---------------------------------------------------------------------------

/// Resolves every object id as a mutable shared object at version 1.
pub struct StaticObjects;

#[async_trait]
impl ObjectResolver for StaticObjects {
    async fn resolve_object(&self, id: &Address) -> TransactionResult<ObjectArg> {
        Ok(ObjectArg::SharedObject {
            id: *id,
            initial_shared_version: 1,
            mutable: true,
        })
    }
}

/// Wallet over a local key that can decline the first N prompts.
pub struct ScriptedWallet {
    inner: LocalWallet,
    declines: AtomicU32,
    fail_reports: bool,
    pub reported: Mutex<Vec<String>>,
}

impl ScriptedWallet {
    pub fn new(declines: u32) -> Self {
        Self {
            inner: LocalWallet::from_private_key(TEST_PRIVATE_KEY, "sui:testnet").unwrap(),
            declines: AtomicU32::new(declines),
            fail_reports: false,
            reported: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_reports(mut self) -> Self {
        self.fail_reports = true;
        self
    }
}

#[async_trait]
impl WalletSigner for ScriptedWallet {
    fn current_address(&self) -> Option<String> {
        self.inner.current_address()
    }

    async fn sign_transaction(
        &self,
        transaction: &SponsoredTransaction,
        chain: &str,
    ) -> Result<String, WalletError> {
        let remaining = self.declines.load(Ordering::SeqCst);
        if remaining > 0 {
            self.declines.store(remaining - 1, Ordering::SeqCst);
            return Err(WalletError::Rejected("user declined".into()));
        }
        self.inner.sign_transaction(transaction, chain).await
    }

    async fn report_effects(&self, digest: &str, _raw_effects: &[u8]) -> Result<(), WalletError> {
        self.reported.lock().unwrap().push(digest.to_string());
        if self.fail_reports {
            return Err(WalletError::Signing("wallet busy".into()));
        }
        Ok(())
    }
}

/// Gateway double answering from memory with a fixed digest.
pub struct MemoryGateway {
    pub digest: String,
    pub sponsor_calls: AtomicU32,
    pub execute_calls: AtomicU32,
}

impl MemoryGateway {
    pub fn new(digest: &str) -> Self {
        Self {
            digest: digest.to_string(),
            sponsor_calls: AtomicU32::new(0),
            execute_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl SponsorGateway for MemoryGateway {
    async fn sponsor(&self, _request: &SponsorshipRequest) -> Result<SponsorshipGrant, GatewayError> {
        self.sponsor_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SponsorshipGrant {
            digest: self.digest.clone(),
            bytes: BASE64.encode(format!("sponsored:{}", self.digest)),
        })
    }

    async fn execute(&self, digest: &str, _signature: &str) -> Result<ExecutedTransaction, GatewayError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutedTransaction {
            digest: digest.to_string(),
        })
    }
}

/// Chain double that never reaches a terminal state.
pub struct NeverFinal {
    pub polls: AtomicU32,
}

#[async_trait]
impl FinalityRpc for NeverFinal {
    async fn transaction_state(&self, _digest: &str) -> BlockchainResult<TransactionState> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(TransactionState::Pending)
    }
}
