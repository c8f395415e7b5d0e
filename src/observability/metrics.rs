//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by route, status
//! - `gate_request_duration_seconds` (histogram): latency by route
//! - `gate_rate_limited_total` (counter): rejected admissions
//! - `gate_logins_total` (counter): logins by outcome
//! - `gate_tracked_identities` (gauge): identities with a request window
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(route: String, status: u16, start: Instant) {
    counter!("gate_requests_total", "route" => route.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("gate_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a rate-limit rejection.
pub fn record_rate_limited() {
    counter!("gate_rate_limited_total").increment(1);
}

/// Record a login attempt ("success" or "failure").
pub fn record_login(outcome: &'static str) {
    counter!("gate_logins_total", "outcome" => outcome).increment(1);
}

/// Report the number of identities with a request window.
pub fn record_tracked_identities(count: usize) {
    gauge!("gate_tracked_identities").set(count as f64);
}
