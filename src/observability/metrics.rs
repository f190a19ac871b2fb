//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): gateway requests by endpoint, status
//! - `relay_request_duration_seconds` (histogram): handler latency by endpoint
//! - `relay_provider_failures_total` (counter): provider calls that produced no verdict, by endpoint, kind
//!
//! Without an installed recorder every call here is a no-op.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(endpoint: &'static str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "relay_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "endpoint" => endpoint)
        .record(elapsed.as_secs_f64());
}

pub fn record_provider_failure(endpoint: &'static str, kind: &'static str) {
    metrics::counter!(
        "relay_provider_failures_total",
        "endpoint" => endpoint,
        "kind" => kind
    )
    .increment(1);
}
