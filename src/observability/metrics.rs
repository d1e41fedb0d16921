//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_unauthorized_total` (counter): rejected credentials
//! - `proxy_rate_limited_total` (counter): requests over the window
//!
//! # Design Decisions
//! - Recording is always on and cheap; the Prometheus exporter is optional
//!   and bound to its own address when enabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to start metrics exporter"),
    }
}

/// Record one completed request through the pipeline.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request rejected for a missing or invalid credential.
pub fn record_unauthorized() {
    metrics::counter!("proxy_unauthorized_total").increment(1);
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    metrics::counter!("proxy_rate_limited_total").increment(1);
}
