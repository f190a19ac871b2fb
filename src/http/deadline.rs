//! Whole-request deadline.
//!
//! A request that outlives the deadline gets the same marked 500 as a provider
//! timeout, never a bare 408 that a client could mistake for a provider verdict.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

use crate::http::request::X_REQUEST_ID;
use crate::http::response::RelayError;
use crate::observability::metrics;
use crate::provider::ProviderError;

pub async fn request_deadline(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            let error = ProviderError::Timeout;
            tracing::error!(
                request_id = ?request_id,
                path = %path,
                limit_secs = limit.as_secs(),
                "Request deadline exceeded"
            );
            metrics::record_provider_failure(endpoint(&path), error.kind());
            RelayError::Provider(error).into_response()
        }
    }
}

fn endpoint(path: &str) -> &'static str {
    if path.starts_with("/execute") {
        "execute"
    } else if path.starts_with("/sponsor") {
        "sponsor"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::RELAY_ERROR_HEADER;
    use crate::provider::RELAY_UNREACHABLE;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    fn app(handler_delay: Duration) -> Router {
        Router::new()
            .route(
                "/sponsor",
                post(move || async move {
                    tokio::time::sleep(handler_delay).await;
                    StatusCode::REQUEST_TIMEOUT
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Duration::from_secs(1),
                request_deadline,
            ))
    }

    fn sponsor_request() -> Request {
        Request::builder()
            .method("POST")
            .uri("/sponsor")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_answers_marked_500() {
        let response = app(Duration::from_secs(5)).oneshot(sponsor_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[RELAY_ERROR_HEADER], RELAY_UNREACHABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_status_passes_through_in_time() {
        let response = app(Duration::from_millis(10)).oneshot(sponsor_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert!(response.headers().get(RELAY_ERROR_HEADER).is_none());
    }

    #[test]
    fn test_endpoint_labels() {
        assert_eq!(endpoint("/execute/d1"), "execute");
        assert_eq!(endpoint("/sponsor"), "sponsor");
        assert_eq!(endpoint("/health"), "other");
    }
}
