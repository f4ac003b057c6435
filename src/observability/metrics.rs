//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_forward_requests_total` (counter): forwarded calls by resource, action, status
//! - `gateway_forward_duration_seconds` (histogram): end-to-end latency per action
//! - `gateway_validation_rejections_total` (counter): rejections by resource and field
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_forward(resource: &'static str, action: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_forward_requests_total",
        "resource" => resource,
        "action" => action,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_forward_duration_seconds",
        "resource" => resource,
        "action" => action
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_validation_rejection(resource: &'static str, field: &'static str) {
    counter!(
        "gateway_validation_rejections_total",
        "resource" => resource,
        "field" => field
    )
    .increment(1);
}
