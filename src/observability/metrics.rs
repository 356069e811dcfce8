//! Self-metrics for the telemetry pipeline.
//!
//! Recorded through the `metrics` facade; a no-op until a recorder is
//! installed by [`init_metrics`].
//!
//! # Metrics
//! - `telemetry_delivery_attempts_total` (counter): attempts by sink, outcome
//! - `telemetry_delivery_failures_total` (counter): payloads dropped by sink
//! - `telemetry_delivery_duration_seconds` (histogram): send time incl. retries
//! - `telemetry_flushes_total` (counter): reporter ticks by outcome
//! - `telemetry_log_records_total` (counter): records by level, type

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Self-metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_delivery_attempt(sink: &'static str, outcome: &'static str) {
    counter!("telemetry_delivery_attempts_total", "sink" => sink, "outcome" => outcome).increment(1);
}

pub fn record_delivery_result(sink: &'static str, delivered: bool, start: Instant) {
    histogram!("telemetry_delivery_duration_seconds", "sink" => sink)
        .record(start.elapsed().as_secs_f64());
    if !delivered {
        counter!("telemetry_delivery_failures_total", "sink" => sink).increment(1);
    }
}

pub fn record_flush(outcome: &'static str) {
    counter!("telemetry_flushes_total", "outcome" => outcome).increment(1);
}

pub fn record_log_record(level: &'static str, log_type: &'static str) {
    counter!("telemetry_log_records_total", "level" => level, "type" => log_type).increment(1);
}
