//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_accepted_total` (counter)
//! - `proxy_active_connections` (gauge)
//! - `proxy_requests_total` (counter): by `outcome`
//! - `proxy_errors_total` (counter): by `kind`
//! - `proxy_response_bytes_total` (counter): bytes relayed to clients
//! - `proxy_request_duration_seconds` (histogram)
//!
//! Without an installed recorder every call is a no-op, so the pipeline
//! records unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_accepted() {
    metrics::counter!("proxy_connections_accepted_total").increment(1);
    metrics::gauge!("proxy_active_connections").increment(1.0);
}

pub fn record_closed() {
    metrics::gauge!("proxy_active_connections").decrement(1.0);
}

/// Record the end of one request. `outcome` is `"relayed"` or an error kind.
pub fn record_request(outcome: &'static str, response_bytes: u64, start: Instant) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome).increment(1);
    metrics::counter!("proxy_response_bytes_total").increment(response_bytes);
    metrics::histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("proxy_errors_total", "kind" => kind).increment(1);
}
