//! Metrics collection and exposition.
//!
//! # Metrics
//! - `catalog_operations_total` (counter): operations by name and outcome
//! - `catalog_operation_duration_seconds` (histogram): operation latency
//! - `catalog_courses` (gauge): catalog size at the last count
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the completion of a catalog operation.
pub fn record_operation(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "catalog_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("catalog_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_catalog_size(count: usize) {
    gauge!("catalog_courses").set(count as f64);
}
