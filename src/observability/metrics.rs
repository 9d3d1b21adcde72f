//! Metrics collection and exposition.
//!
//! # Metrics
//! - `menu_requests_total` (counter): total requests by method, path, status
//! - `menu_request_duration_seconds` (histogram): latency distribution
//!
//! The Prometheus exporter is opt-in; when no metrics address is configured
//! the recorders below are no-ops against the default registry.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("menu_requests_total", &labels).increment(1);
    histogram!("menu_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}
