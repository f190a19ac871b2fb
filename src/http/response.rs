//! Gateway responses.
//!
//! Provider errors are relayed byte-for-byte with the provider's status and
//! content type. Failures that leave no provider verdict become a fixed 500
//! tagged with `x-relay-error`.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::provider::{ProviderError, ProviderReply};

/// Header marking a 500 produced by the gateway itself.
pub const RELAY_ERROR_HEADER: &str = "x-relay-error";

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors a handler answers without a provider verdict.
#[derive(Debug)]
pub enum RelayError {
    /// Local validation failed; the provider was not called.
    BadRequest(String),
    /// The provider could not be reached or answered nonsense.
    Provider(ProviderError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            RelayError::Provider(e) => {
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(RELAY_ERROR_HEADER, HeaderValue::from_static(e.marker()));
                response
            }
        }
    }
}

/// Relay a provider reply unchanged.
pub fn relay_reply(reply: ProviderReply) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = reply.status;
    if let Some(value) = reply
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}
