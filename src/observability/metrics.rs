//! Metrics collection and exposition.
//!
//! # Metrics
//! - `planner_requests_total` (counter): requests by mode, status
//! - `planner_request_duration_seconds` (histogram): end-to-end latency
//! - `planner_upstream_calls_total` (counter): outbound calls by service, outcome
//! - `planner_geocache_lookups_total` (counter): brand cache hits/misses/stale
//! - `planner_geocache_entries` (gauge): cache size
//! - `planner_matrix_degraded_total` (counter): requests that fell back to straight-line

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(mode: &'static str, status: u16, start: Instant) {
    counter!("planner_requests_total", "mode" => mode, "status" => status.to_string())
        .increment(1);
    histogram!("planner_request_duration_seconds", "mode" => mode)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_call(service: &'static str, outcome: &'static str) {
    counter!("planner_upstream_calls_total", "service" => service, "outcome" => outcome)
        .increment(1);
}

pub fn record_cache_lookup(outcome: &'static str) {
    counter!("planner_geocache_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("planner_geocache_entries").set(size as f64);
}

pub fn record_matrix_degraded() {
    counter!("planner_matrix_degraded_total").increment(1);
}
