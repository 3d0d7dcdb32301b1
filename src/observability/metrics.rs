//! Metrics collection and exposition.
//!
//! # Metrics
//! - `appflow_emitted_total` (counter): datagrams handed to the socket
//! - `appflow_emit_dropped_total` (counter): records dropped by the emitter, by reason
//! - `appflow_records_received_total` (counter): records decoded by the collector
//! - `appflow_decode_errors_total` (counter): datagrams the collector rejected
//!
//! Without an installed recorder every update is a no-op, so instrumented
//! applications pay nothing unless they opt in.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// A record was written to the emitter's socket.
pub fn record_emitted() {
    metrics::counter!("appflow_emitted_total").increment(1);
}

/// A record was dropped on the emit path.
pub fn record_emit_dropped(reason: &'static str) {
    metrics::counter!("appflow_emit_dropped_total", "reason" => reason).increment(1);
}

/// The collector decoded a record.
pub fn record_received() {
    metrics::counter!("appflow_records_received_total").increment(1);
}

/// The collector received a datagram that did not decode.
pub fn record_decode_error() {
    metrics::counter!("appflow_decode_errors_total").increment(1);
}
