//! Client side of the sponsorship gateway.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::http::{RELAY_ERROR_HEADER, RELAY_INVALID_RESPONSE};
use crate::sponsorship::error::GatewayError;
use crate::sponsorship::types::{
    ExecuteRequest, ExecutedTransaction, SponsorshipGrant, SponsorshipRequest,
};

/// The two gateway operations the flow depends on.
#[async_trait]
pub trait SponsorGateway: Send + Sync {
    async fn sponsor(&self, request: &SponsorshipRequest) -> Result<SponsorshipGrant, GatewayError>;

    async fn execute(&self, digest: &str, signature: &str) -> Result<ExecutedTransaction, GatewayError>;
}

/// Gateway reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Transport(format!("invalid gateway URL '{}': {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("gateway URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| GatewayError::Malformed(e.to_string()));
        }

        Err(classify_failure(status.as_u16(), &headers, &bytes))
    }
}

/// Tell a relayed provider rejection apart from the gateway's own failure.
fn classify_failure(status: u16, headers: &HeaderMap, body: &[u8]) -> GatewayError {
    if let Some(marker) = headers.get(RELAY_ERROR_HEADER).and_then(|v| v.to_str().ok()) {
        return if marker == RELAY_INVALID_RESPONSE {
            GatewayError::Malformed("provider returned an invalid response".to_string())
        } else {
            GatewayError::ProviderUnreachable
        };
    }

    let body = serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
    GatewayError::Rejected { status, body }
}

#[async_trait]
impl SponsorGateway for HttpGateway {
    async fn sponsor(&self, request: &SponsorshipRequest) -> Result<SponsorshipGrant, GatewayError> {
        let url = self.endpoint(&["sponsor"])?;
        self.post(url, request).await
    }

    async fn execute(&self, digest: &str, signature: &str) -> Result<ExecutedTransaction, GatewayError> {
        let url = self.endpoint(&["execute", digest])?;
        let body = ExecuteRequest {
            signature: signature.to_string(),
        };
        self.post(url, &body).await
    }
}
