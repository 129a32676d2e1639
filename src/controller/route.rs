//! A route under control: its spec, its health endpoint and its debounce state.

use url::Url;

use crate::bgp::RouteSpec;
use crate::config::schema::{HealthConfig, RouteConfig};
use crate::config::validation::{parse_health_url, parse_route, ValidationError};
use crate::health::{
    DebounceCounters, DebounceStateMachine, HealthCheckResult, RouteState, Thresholds, Transition,
};
use crate::observability::metrics;

/// Per-route state threaded through the control loop.
#[derive(Debug, Clone)]
pub struct ControlledRoute {
    spec: RouteSpec,
    endpoint: Url,
    machine: DebounceStateMachine,
}

impl ControlledRoute {
    pub fn new(spec: RouteSpec, endpoint: Url, thresholds: &Thresholds) -> Self {
        Self {
            spec,
            endpoint,
            machine: DebounceStateMachine::new(thresholds),
        }
    }

    /// Build from a route entry and the shared health settings.
    pub fn from_config(route: &RouteConfig, health: &HealthConfig) -> Result<Self, ValidationError> {
        let spec = parse_route(&route.prefix, route.next_hop_self).map_err(|source| {
            ValidationError::InvalidRoute {
                prefix: route.prefix.clone(),
                source,
            }
        })?;

        let url = health.url_for(route);
        let endpoint = parse_health_url(url).map_err(|reason| ValidationError::InvalidUrl {
            field: format!("route {}", spec),
            url: url.to_string(),
            reason,
        })?;

        Ok(Self::new(spec, endpoint, &health.thresholds_for(route)))
    }

    /// Feed one probe result into the state machine.
    pub fn observe(&mut self, result: &HealthCheckResult) -> Option<Transition> {
        let was_failing = self.machine.counters().consecutive_failures > 0;
        let transition = self.machine.observe(result.success);
        let counters = self.machine.counters();

        match transition {
            Some(t) => {
                metrics::record_transition(&self.spec.to_string(), t.target());
                tracing::info!(
                    route = %self.spec,
                    state = %t.target(),
                    successes = counters.consecutive_successes,
                    failures = counters.consecutive_failures,
                    detail = %result.detail,
                    "Route state changed"
                );
            }
            None if !result.success && !was_failing => {
                tracing::warn!(
                    route = %self.spec,
                    state = %self.machine.state(),
                    detail = %result.detail,
                    "Health check failed"
                );
            }
            None => {
                tracing::debug!(
                    route = %self.spec,
                    state = %self.machine.state(),
                    successes = counters.consecutive_successes,
                    failures = counters.consecutive_failures,
                    "Health check observed"
                );
            }
        }

        transition
    }

    /// Withdraw regardless of health; `Some` only if the route was announced.
    pub fn force_withdraw(&mut self) -> Option<Transition> {
        let transition = self.machine.force_withdraw();
        if let Some(t) = transition {
            metrics::record_transition(&self.spec.to_string(), t.target());
        }
        transition
    }

    pub fn spec(&self) -> &RouteSpec {
        &self.spec
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn state(&self) -> RouteState {
        self.machine.state()
    }

    pub fn counters(&self) -> DebounceCounters {
        self.machine.counters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeDetail;
    use std::time::Duration;

    fn result(success: bool) -> HealthCheckResult {
        let code = if success { 200 } else { 503 };
        HealthCheckResult::new(ProbeDetail::Status { code }, Duration::from_millis(1))
    }

    #[test]
    fn test_builds_from_config_with_overrides() {
        let health = HealthConfig::default();
        let mut config = RouteConfig::new("10.0.100.1");
        config.success_threshold = Some(1);
        config.health_url = Some("http://127.0.0.1:9000/ready".into());

        let mut route = ControlledRoute::from_config(&config, &health).unwrap();
        assert_eq!(route.spec().to_string(), "10.0.100.1/32");
        assert_eq!(route.endpoint().as_str(), "http://127.0.0.1:9000/ready");
        assert_eq!(route.state(), RouteState::Withdrawn);

        assert_eq!(route.observe(&result(true)), Some(Transition::Announce));
        assert_eq!(route.state(), RouteState::Announced);
    }

    #[test]
    fn test_rejects_invalid_prefix() {
        let health = HealthConfig::default();
        let err = ControlledRoute::from_config(&RouteConfig::new("10.0.100.1/40"), &health).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRoute { .. }));
    }

    #[test]
    fn test_force_withdraw_resets_counters() {
        let health = HealthConfig::default();
        let mut route = ControlledRoute::from_config(&RouteConfig::new("10.0.100.1/32"), &health).unwrap();
        for _ in 0..3 {
            route.observe(&result(true));
        }
        assert_eq!(route.state(), RouteState::Announced);

        assert_eq!(route.force_withdraw(), Some(Transition::Withdraw));
        assert_eq!(route.counters(), DebounceCounters::default());
        assert_eq!(route.force_withdraw(), None);
    }
}
