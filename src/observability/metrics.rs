//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): outbound relay calls by outcome
//! - `dispatch_total` (counter): dispatched results by path (relay / local)
//! - `extracted_inputs_total` (counter): extracted request inputs by kind
//!
//! Without an installed recorder every update is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of a relay call ("ok", "bad_request", ...).
pub fn record_relay(outcome: &'static str) {
    metrics::counter!("relay_requests_total", "outcome" => outcome).increment(1);
}

/// Record which path a dispatched result took.
pub fn record_dispatch(path: &'static str) {
    metrics::counter!("dispatch_total", "path" => path).increment(1);
}

/// Record extracted inputs of a kind ("text", "image").
pub fn record_extracted(kind: &'static str, count: usize) {
    metrics::counter!("extracted_inputs_total", "kind" => kind).increment(count as u64);
}
