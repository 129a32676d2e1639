//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds >= 1, interval and timeout > 0)
//! - Check every route parses and appears once
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the control loop starts; an invalid config never ticks

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::bgp::{Prefix, RouteSpec, RouteSpecError};
use crate::config::schema::ControllerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no routes configured")]
    NoRoutes,

    #[error("route `{prefix}`: {source}")]
    InvalidRoute {
        prefix: String,
        #[source]
        source: RouteSpecError,
    },

    #[error("route `{0}` is configured more than once")]
    DuplicateRoute(String),

    #[error("{field} must be at least 1")]
    ZeroThreshold { field: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field}: invalid health URL `{url}`: {reason}")]
    InvalidUrl {
        field: String,
        url: String,
        reason: String,
    },

    #[error("observability.log_level: unknown level `{0}`")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address: invalid socket address `{0}`")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let health = &config.health;
    if health.interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health.interval_ms" });
    }
    if health.timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health.timeout_ms" });
    }
    check_threshold(&mut errors, "health.success_threshold".into(), Some(health.success_threshold));
    check_threshold(&mut errors, "health.failure_threshold".into(), Some(health.failure_threshold));
    check_url(&mut errors, "health.url".into(), &health.url);

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        match parse_route(&route.prefix, route.next_hop_self) {
            Ok(spec) => {
                if !seen.insert(*spec.prefix()) {
                    errors.push(ValidationError::DuplicateRoute(spec.prefix().to_string()));
                }
            }
            Err(source) => errors.push(ValidationError::InvalidRoute {
                prefix: route.prefix.clone(),
                source,
            }),
        }

        check_threshold(&mut errors, format!("routes[{}].success_threshold", i), route.success_threshold);
        check_threshold(&mut errors, format!("routes[{}].failure_threshold", i), route.failure_threshold);
        if let Some(url) = &route.health_url {
            check_url(&mut errors, format!("routes[{}].health_url", i), url);
        }
    }

    let observability = &config.observability;
    if LevelFilter::from_str(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a configured route into a `RouteSpec`.
pub fn parse_route(prefix: &str, next_hop_self: bool) -> Result<RouteSpec, RouteSpecError> {
    let prefix: Prefix = prefix.parse()?;
    RouteSpec::new(prefix, next_hop_self)
}

/// Parse a health URL, accepting only http and https.
pub fn parse_health_url(url: &str) -> Result<Url, String> {
    let parsed = Url::parse(url).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("unsupported scheme `{}`", other)),
    }
}

fn check_threshold(errors: &mut Vec<ValidationError>, field: String, value: Option<u32>) {
    if value == Some(0) {
        errors.push(ValidationError::ZeroThreshold { field });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: String, url: &str) {
    if let Err(reason) = parse_health_url(url) {
        errors.push(ValidationError::InvalidUrl {
            field,
            url: url.to_string(),
            reason,
        });
    }
}
