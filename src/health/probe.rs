//! Active health probing.
//!
//! # Responsibilities
//! - Perform one bounded HTTP GET against the service's health endpoint
//! - Fold every outcome (status, connect error, timeout) into a result value

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant, SystemTime};

use reqwest::redirect::Policy;
use serde::Serialize;
use tokio::time;
use url::Url;

/// What a probe observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeDetail {
    /// The endpoint answered with this status code.
    Status { code: u16 },
    /// No answer within the probe timeout.
    Timeout { after_ms: u64 },
    /// TCP connection could not be established.
    Connect { message: String },
    /// Any other request failure (protocol error, bad response).
    Request { message: String },
}

impl ProbeDetail {
    /// Only a 2xx answer counts as healthy.
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeDetail::Status { code } if (200..300).contains(code))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeDetail::Status { .. } => "status",
            ProbeDetail::Timeout { .. } => "timeout",
            ProbeDetail::Connect { .. } => "connect",
            ProbeDetail::Request { .. } => "request",
        }
    }
}

impl fmt::Display for ProbeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeDetail::Status { code } => write!(f, "status {}", code),
            ProbeDetail::Timeout { after_ms } => write!(f, "timed out after {}ms", after_ms),
            ProbeDetail::Connect { message } => write!(f, "connection failed: {}", message),
            ProbeDetail::Request { message } => write!(f, "request failed: {}", message),
        }
    }
}

/// Outcome of a single probe. Built fresh each tick and consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckResult {
    pub checked_at: SystemTime,
    pub success: bool,
    pub detail: ProbeDetail,
    pub elapsed: Duration,
}

impl HealthCheckResult {
    pub fn new(detail: ProbeDetail, elapsed: Duration) -> Self {
        Self {
            checked_at: SystemTime::now(),
            success: detail.is_success(),
            detail,
            elapsed,
        }
    }
}

/// A single bounded health check.
///
/// Implementations must not return errors: every failure mode is a
/// `HealthCheckResult` with `success == false`.
pub trait HealthCheck {
    fn check(
        &self,
        endpoint: &Url,
        timeout: Duration,
    ) -> impl Future<Output = HealthCheckResult> + Send;
}

/// HTTP GET health probe.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        // Redirects are answers too: a 3xx is not healthy.
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .no_proxy()
            .user_agent(concat!("anycast-controller/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HealthCheck for HttpProbe {
    async fn check(&self, endpoint: &Url, timeout: Duration) -> HealthCheckResult {
        let started = Instant::now();
        let request = self.client.get(endpoint.clone()).timeout(timeout).send();

        let detail = match time::timeout(timeout, request).await {
            Ok(Ok(response)) => ProbeDetail::Status {
                code: response.status().as_u16(),
            },
            Ok(Err(e)) if e.is_timeout() => ProbeDetail::Timeout {
                after_ms: timeout.as_millis() as u64,
            },
            Ok(Err(e)) if e.is_connect() => ProbeDetail::Connect {
                message: e.to_string(),
            },
            Ok(Err(e)) => ProbeDetail::Request {
                message: e.to_string(),
            },
            Err(_) => ProbeDetail::Timeout {
                after_ms: timeout.as_millis() as u64,
            },
        };

        let result = HealthCheckResult::new(detail, started.elapsed());
        tracing::debug!(
            endpoint = %endpoint,
            success = result.success,
            detail = %result.detail,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Health probe finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_2xx_is_success() {
        assert!(ProbeDetail::Status { code: 200 }.is_success());
        assert!(ProbeDetail::Status { code: 204 }.is_success());
        assert!(!ProbeDetail::Status { code: 301 }.is_success());
        assert!(!ProbeDetail::Status { code: 503 }.is_success());
        assert!(!ProbeDetail::Timeout { after_ms: 2000 }.is_success());
        assert!(!ProbeDetail::Connect { message: "refused".into() }.is_success());
    }

    #[test]
    fn test_result_derives_success_from_detail() {
        let ok = HealthCheckResult::new(ProbeDetail::Status { code: 200 }, Duration::from_millis(3));
        assert!(ok.success);

        let bad = HealthCheckResult::new(ProbeDetail::Status { code: 500 }, Duration::from_millis(3));
        assert!(!bad.success);
    }

    #[test]
    fn test_detail_serializes_with_kind_tag() {
        let json = serde_json::to_value(ProbeDetail::Status { code: 503 }).unwrap();
        assert_eq!(json["kind"], "status");
        assert_eq!(json["code"], 503);
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_failure_result() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::new().unwrap();
        let endpoint = Url::parse(&format!("http://{}/health", addr)).unwrap();
        let result = probe.check(&endpoint, Duration::from_secs(2)).await;

        assert!(!result.success);
        assert!(matches!(
            result.detail,
            ProbeDetail::Connect { .. } | ProbeDetail::Request { .. }
        ));
    }
}
