//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_proxy_requests_total` (counter): requests by method, status
//! - `cors_proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `cors_proxy_redirects_followed_total` (counter): hops followed
//! - `cors_proxy_upstream_errors_total` (counter): by kind (connect, timeout)
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "cors_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("cors_proxy_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_redirect() {
    metrics::counter!("cors_proxy_redirects_followed_total").increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("cors_proxy_upstream_errors_total", "kind" => kind).increment(1);
}
