//! `POST /execute/{digest}`

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Instant;

use crate::http::request::request_id;
use crate::http::response::{relay_reply, RelayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::provider::ProviderError;
use crate::sponsorship::{ExecuteRequest, ExecutedTransaction};

const ENDPOINT: &str = "execute";

pub async fn execute_handler(
    State(state): State<AppState>,
    Path(digest): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let request_id = request_id(&headers);

    let response = match relay_execute(&state, request_id, &digest, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(ENDPOINT, response.status().as_u16(), started.elapsed());
    response
}

async fn relay_execute(
    state: &AppState,
    request_id: Option<&str>,
    digest: &str,
    body: &[u8],
) -> Result<Response, RelayError> {
    if digest.trim().is_empty() {
        return Err(RelayError::BadRequest("digest is required".to_string()));
    }
    let request: ExecuteRequest = serde_json::from_slice(body)
        .map_err(|e| RelayError::BadRequest(format!("invalid execute request: {e}")))?;
    if request.signature.trim().is_empty() {
        return Err(RelayError::BadRequest("signature is required".to_string()));
    }

    let reply = state
        .provider
        .execute(digest, &request, request_id)
        .await
        .map_err(|e| provider_failure(request_id, e))?;

    if !reply.is_success() {
        tracing::warn!(
            request_id = ?request_id,
            digest = %digest,
            status = reply.status.as_u16(),
            "Provider rejected execution"
        );
        return Ok(relay_reply(reply));
    }

    let executed: ExecutedTransaction = reply.data().map_err(|e| provider_failure(request_id, e))?;
    tracing::info!(request_id = ?request_id, digest = %executed.digest, "Sponsored transaction submitted");
    Ok(Json(executed).into_response())
}

fn provider_failure(request_id: Option<&str>, e: ProviderError) -> RelayError {
    tracing::error!(request_id = ?request_id, endpoint = ENDPOINT, error = %e, "Provider call failed");
    metrics::record_provider_failure(ENDPOINT, e.kind());
    RelayError::Provider(e)
}
