//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, status, outcome
//! - `router_request_duration_seconds` (histogram): dispatch latency
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Prometheus endpoint only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A route matched and produced a response (possibly via an error mapper).
    Handled,
    /// Nothing matched.
    NotFound,
    /// The handler failed and no error mapper accepted the error.
    Failed,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_dispatch(method: &Method, status: StatusCode, outcome: DispatchOutcome, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.as_u16().to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];
    metrics::counter!("router_requests_total", &labels).increment(1);
    metrics::histogram!("router_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
