//! HTTP client for the sponsorship provider API.
//!
//! # Security
//! - The bearer credential is injected once at construction
//! - It is attached to outgoing requests only and never logged

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::config::ProviderConfig;
use crate::provider::types::{ProviderError, ProviderReply};
use crate::sponsorship::{ExecuteRequest, SponsorshipRequest};

/// Header carrying the gateway's request id upstream.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const SPONSOR_PATH: [&str; 3] = ["v1", "transaction-blocks", "sponsor"];

#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// `POST /v1/transaction-blocks/sponsor`
    pub async fn sponsor(
        &self,
        request: &SponsorshipRequest,
        request_id: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        self.post(&[], request, request_id).await
    }

    /// `POST /v1/transaction-blocks/sponsor/{digest}`
    pub async fn execute(
        &self,
        digest: &str,
        request: &ExecuteRequest,
        request_id: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        self.post(&[digest], request, request_id).await
    }

    fn url(&self, extra: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(SPONSOR_PATH).extend(extra);
        }
        url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        extra: &[&str],
        body: &B,
        request_id: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        let url = self.url(extra);
        let mut request = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(body);
        if let Some(id) = request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let response = request.send().await.map_err(ProviderError::from_reqwest)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(ProviderError::from_reqwest)?;

        Ok(ProviderReply {
            status,
            content_type,
            body,
        })
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
