// src/core/metrics.rs

//! Defines and registers Prometheus metrics for server monitoring.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, TextEncoder, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    /// The number of sessions currently open.
    pub static ref CONNECTED_CLIENTS: Gauge =
        register_gauge!("rpserver_connected_clients", "Number of currently open sessions.").unwrap();

    /// The total number of connections accepted since startup.
    pub static ref CONNECTIONS_RECEIVED_TOTAL: Counter =
        register_counter!("rpserver_connections_received_total", "Total number of connections received.").unwrap();
    /// Connections closed immediately because `max_clients` was reached.
    pub static ref CONNECTIONS_REJECTED_TOTAL: Counter =
        register_counter!("rpserver_connections_rejected_total", "Total number of connections rejected by the client limit.").unwrap();
    /// Connections dropped because the WebSocket upgrade did not finish in time.
    pub static ref HANDSHAKE_TIMEOUTS_TOTAL: Counter =
        register_counter!("rpserver_handshake_timeouts_total", "Total number of connections that timed out during the WebSocket handshake.").unwrap();
    /// Commands that reached a handler, labeled by command name.
    pub static ref COMMANDS_PROCESSED_TOTAL: CounterVec =
        register_counter_vec!("rpserver_commands_processed_total", "Total number of commands processed, labeled by command.", &["command"]).unwrap();
    /// Frames answered with the `unknown_cmd` envelope.
    pub static ref UNKNOWN_COMMANDS_TOTAL: Counter =
        register_counter!("rpserver_unknown_commands_total", "Total number of unparsable or unknown requests.").unwrap();

    /// A histogram of handler latencies.
    pub static ref COMMAND_LATENCY_SECONDS: Histogram =
        register_histogram!("rpserver_command_latency_seconds", "Latency of command handling in seconds.").unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
