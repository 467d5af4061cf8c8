//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): proxy latency distribution
//! - `gateway_rate_limited_total` (counter): rejections by policy
//! - `gateway_service_healthy` (gauge): 1=healthy, 0=unhealthy per service

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Failure to start
/// metrics never blocks the gateway itself.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one proxied request (or proxy-originated 503).
pub fn record_proxied_request(method: &str, status: u16, service: &str, started: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("service", service.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
}

/// Record a rate-limit rejection.
pub fn record_rate_limited(policy: &str) {
    counter!("gateway_rate_limited_total", "policy" => policy.to_string()).increment(1);
}

/// Record the latest probe verdict for a service.
pub fn record_service_health(service: &str, healthy: bool) {
    gauge!("gateway_service_healthy", "service" => service.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
