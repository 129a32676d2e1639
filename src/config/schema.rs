//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::health::Thresholds;

/// Root configuration for the route controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControllerConfig {
    /// Health probe and debounce settings.
    pub health: HealthConfig,

    /// Where route commands are written.
    pub announcer: AnnouncerConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Routes under control.
    pub routes: Vec<RouteConfig>,
}

/// Health probe configuration, shared by all routes unless overridden.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Health endpoint URL (HAProxy stats health by default).
    pub url: String,

    /// Probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Poll interval in milliseconds.
    pub interval_ms: u64,

    /// Consecutive successes before announcing.
    pub success_threshold: u32,

    /// Consecutive failures before withdrawing.
    pub failure_threshold: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8404/health".to_string(),
            timeout_ms: 2000,
            interval_ms: 1000,
            success_threshold: 3,
            failure_threshold: 2,
        }
    }
}

impl HealthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Thresholds for a route, applying its overrides.
    pub fn thresholds_for(&self, route: &RouteConfig) -> Thresholds {
        Thresholds {
            success_threshold: route.success_threshold.unwrap_or(self.success_threshold),
            failure_threshold: route.failure_threshold.unwrap_or(self.failure_threshold),
            poll_interval: self.poll_interval(),
            probe_timeout: self.probe_timeout(),
        }
    }

    /// Health URL for a route, applying its override.
    pub fn url_for<'a>(&'a self, route: &'a RouteConfig) -> &'a str {
        route.health_url.as_deref().unwrap_or(&self.url)
    }
}

/// Command channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AnnouncerConfig {
    pub channel: ChannelConfig,
}

/// Command channel target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelConfig {
    /// Standard output (the speaker spawned us as an API process).
    #[default]
    Stdout,
    /// Named pipe the speaker reads commands from.
    Pipe(PathBuf),
}

/// A route under control.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Prefix in CIDR notation; a bare address means a host route.
    pub prefix: String,

    /// Advertise with our own address as next hop.
    #[serde(default = "default_next_hop_self")]
    pub next_hop_self: bool,

    /// Health URL override for this route.
    #[serde(default)]
    pub health_url: Option<String>,

    /// Success threshold override.
    #[serde(default)]
    pub success_threshold: Option<u32>,

    /// Failure threshold override.
    #[serde(default)]
    pub failure_threshold: Option<u32>,
}

impl RouteConfig {
    /// A route with no overrides.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next_hop_self: true,
            health_url: None,
            success_threshold: None,
            failure_threshold: None,
        }
    }
}

fn default_next_hop_self() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_local_haproxy() {
        let config = ControllerConfig::default();
        assert_eq!(config.health.url, "http://127.0.0.1:8404/health");
        assert_eq!(config.health.timeout_ms, 2000);
        assert_eq!(config.health.interval_ms, 1000);
        assert_eq!(config.announcer.channel, ChannelConfig::Stdout);
        assert!(config.routes.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_route_overrides_apply() {
        let health = HealthConfig::default();
        let mut route = RouteConfig::new("10.0.100.1/32");
        assert_eq!(health.thresholds_for(&route).success_threshold, 3);
        assert_eq!(health.url_for(&route), health.url);

        route.success_threshold = Some(5);
        route.failure_threshold = Some(1);
        route.health_url = Some("http://127.0.0.1:9000/ready".into());

        let thresholds = health.thresholds_for(&route);
        assert_eq!(thresholds.success_threshold, 5);
        assert_eq!(thresholds.failure_threshold, 1);
        assert_eq!(thresholds.poll_interval, Duration::from_secs(1));
        assert_eq!(health.url_for(&route), "http://127.0.0.1:9000/ready");
    }

    #[test]
    fn test_channel_deserializes_both_forms() {
        #[derive(Deserialize)]
        struct Wrapper {
            channel: ChannelConfig,
        }

        let stdout: Wrapper = toml::from_str(r#"channel = "stdout""#).unwrap();
        assert_eq!(stdout.channel, ChannelConfig::Stdout);

        let pipe: Wrapper = toml::from_str(r#"channel = { pipe = "/run/exabgp.in" }"#).unwrap();
        assert_eq!(pipe.channel, ChannelConfig::Pipe(PathBuf::from("/run/exabgp.in")));
    }
}
