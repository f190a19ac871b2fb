//! Gateway server setup.
//!
//! # Responsibilities
//! - Build the provider client from configuration (credential injected once)
//! - Create the Axum router with the relay handlers
//! - Wire up middleware (request ID, tracing, body limit, request deadline)
//! - Serve on a plain or TLS listener with graceful shutdown

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::deadline::request_deadline;
use crate::http::execute::execute_handler;
use crate::http::health::health_handler;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::sponsor::sponsor_handler;
use crate::provider::{ProviderClient, ProviderError};
use crate::sponsorship::Network;

/// Time given to in-flight requests once shutdown starts (TLS listener).
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid default network: {0}")]
    InvalidNetwork(String),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ProviderClient>,
    pub default_network: Network,
}

/// The sponsorship gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(config: &RelayConfig) -> Result<Self, ServerError> {
        let provider = ProviderClient::new(&config.provider)?;
        let default_network = Network::from_str(&config.provider.default_network)
            .map_err(ServerError::InvalidNetwork)?;

        tracing::info!(
            provider = %config.provider.base_url,
            default_network = %default_network,
            "Gateway configured"
        );

        let state = AppState {
            provider: Arc::new(provider),
            default_network,
        };

        Ok(Self {
            router: Self::build_router(config, state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/sponsor", post(sponsor_handler))
            .route("/execute/{digest}", post(execute_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(axum::middleware::from_fn_with_state(
                        Duration::from_secs(config.timeouts.request_secs),
                        request_deadline,
                    ))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// The configured router, for in-process serving and tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Serve over TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
        });

        tracing::info!(address = %addr, "Gateway listening (TLS)");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}
