//! `POST /sponsor`

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::Instant;

use crate::http::request::request_id;
use crate::http::response::{relay_reply, RelayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::provider::ProviderError;
use crate::sponsorship::{SponsorshipGrant, SponsorshipRequest};

const ENDPOINT: &str = "sponsor";

pub async fn sponsor_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let request_id = request_id(&headers);

    let response = match relay_sponsor(&state, request_id, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(ENDPOINT, response.status().as_u16(), started.elapsed());
    response
}

async fn relay_sponsor(
    state: &AppState,
    request_id: Option<&str>,
    body: &[u8],
) -> Result<Response, RelayError> {
    let mut request: SponsorshipRequest = serde_json::from_slice(body)
        .map_err(|e| RelayError::BadRequest(format!("invalid sponsor request: {e}")))?;
    validate(&request)?;

    let network = *request.network.get_or_insert(state.default_network);
    tracing::debug!(
        request_id = ?request_id,
        network = %network,
        sender = %request.sender,
        "Forwarding sponsor request"
    );

    let reply = state
        .provider
        .sponsor(&request, request_id)
        .await
        .map_err(|e| provider_failure(request_id, e))?;

    if !reply.is_success() {
        tracing::warn!(
            request_id = ?request_id,
            status = reply.status.as_u16(),
            network = %network,
            "Provider rejected sponsorship"
        );
        return Ok(relay_reply(reply));
    }

    let grant: SponsorshipGrant = reply.data().map_err(|e| provider_failure(request_id, e))?;
    tracing::info!(request_id = ?request_id, digest = %grant.digest, network = %network, "Sponsorship granted");
    Ok(Json(grant).into_response())
}

fn validate(request: &SponsorshipRequest) -> Result<(), RelayError> {
    if request.sender.trim().is_empty() {
        return Err(RelayError::BadRequest("sender is required".to_string()));
    }
    let kind_bytes = request.transaction_block_kind_bytes.trim();
    if kind_bytes.is_empty() {
        return Err(RelayError::BadRequest(
            "transactionBlockKindBytes is required".to_string(),
        ));
    }
    match BASE64.decode(kind_bytes) {
        Ok(bytes) if !bytes.is_empty() => Ok(()),
        _ => Err(RelayError::BadRequest(
            "transactionBlockKindBytes must be base64".to_string(),
        )),
    }
}

fn provider_failure(request_id: Option<&str>, e: ProviderError) -> RelayError {
    tracing::error!(request_id = ?request_id, endpoint = ENDPOINT, error = %e, "Provider call failed");
    metrics::record_provider_failure(ENDPOINT, e.kind());
    RelayError::Provider(e)
}
