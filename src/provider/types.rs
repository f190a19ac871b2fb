//! Upstream reply and error types.

use axum::body::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Value of the `x-relay-error` header when the provider could not be reached.
pub const RELAY_UNREACHABLE: &str = "provider-unreachable";
/// Value of the `x-relay-error` header when the provider's 2xx body was unusable.
pub const RELAY_INVALID_RESPONSE: &str = "provider-invalid-response";

/// Failures talking to the sponsorship provider. None of these carry a provider verdict.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider timed out")]
    Timeout,

    #[error("provider transport error: {0}")]
    Transport(String),

    /// 2xx reply whose body is not the expected `{data: ...}` envelope.
    #[error("provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),
}

impl ProviderError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Unreachable(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }

    /// Marker sent to clients in the `x-relay-error` header.
    pub fn marker(&self) -> &'static str {
        match self {
            ProviderError::InvalidResponse(_) => RELAY_INVALID_RESPONSE,
            _ => RELAY_UNREACHABLE,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Unreachable(_) => "unreachable",
            ProviderError::Timeout => "timeout",
            ProviderError::Transport(_) => "transport",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// A raw provider reply, kept byte-for-byte so errors can be relayed verbatim.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

impl ProviderReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Unwrap the `{data: T}` envelope of a success reply.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        serde_json::from_slice::<Envelope<T>>(&self.body)
            .map(|envelope| envelope.data)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
