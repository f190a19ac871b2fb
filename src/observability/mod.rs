//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handlers, provider client, sponsorship flow:
//!     → logging.rs (structured log events, request_id / digest fields)
//!     → metrics.rs (request counters, latency histograms, provider failures)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! The provider credential never appears in either stream.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
