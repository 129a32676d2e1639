//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define controller metrics (probes, transitions, commands)
//! - Optionally expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `anycast_probe_total` (counter): probes by route, result
//! - `anycast_probe_duration_seconds` (histogram): probe latency by route
//! - `anycast_route_transitions_total` (counter): transitions by route, state
//! - `anycast_route_announced` (gauge): 1=announced, 0=withdrawn
//! - `anycast_commands_total` (counter): commands written by action
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::bgp::command::RouteAction;
use crate::health::probe::HealthCheckResult;
use crate::health::state::RouteState;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(route: &str, result: &HealthCheckResult) {
    let outcome = if result.success { "success" } else { result.detail.kind() };
    counter!("anycast_probe_total", "route" => route.to_string(), "result" => outcome).increment(1);
    histogram!("anycast_probe_duration_seconds", "route" => route.to_string())
        .record(result.elapsed.as_secs_f64());
}

pub fn record_transition(route: &str, state: RouteState) {
    counter!(
        "anycast_route_transitions_total",
        "route" => route.to_string(),
        "state" => state.as_str()
    )
    .increment(1);
    record_route_state(route, state);
}

pub fn record_route_state(route: &str, state: RouteState) {
    let value = match state {
        RouteState::Announced => 1.0,
        RouteState::Withdrawn => 0.0,
    };
    gauge!("anycast_route_announced", "route" => route.to_string()).set(value);
}

pub fn record_command(action: RouteAction) {
    counter!("anycast_commands_total", "action" => action.as_str()).increment(1);
}
