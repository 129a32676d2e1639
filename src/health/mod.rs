//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Probe (probe.rs):
//!     One bounded HTTP GET per route per tick
//!     → HealthCheckResult (never an error)
//!
//! State machine (state.rs):
//!     Withdrawn ←→ Announced
//!     With per-direction thresholds to prevent flapping
//!     → Option<Transition> for the announcer
//! ```
//!
//! # Design Decisions
//! - Non-2xx, connect errors and timeouts are all plain failure results
//! - No retries inside a probe; the poll interval is the retry cadence
//! - State is per route, owned by that route's state machine

pub mod probe;
pub mod state;

use std::time::Duration;

pub use probe::{HealthCheck, HealthCheckResult, HttpProbe, ProbeDetail};
pub use state::{DebounceCounters, DebounceStateMachine, RouteState, Transition};

/// Debounce and timing parameters for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Consecutive successes needed to announce.
    pub success_threshold: u32,

    /// Consecutive failures needed to withdraw.
    pub failure_threshold: u32,

    /// Time between ticks.
    pub poll_interval: Duration,

    /// Upper bound on a single probe.
    pub probe_timeout: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            success_threshold: 3,
            failure_threshold: 2,
            poll_interval: Duration::from_millis(1000),
            probe_timeout: Duration::from_millis(2000),
        }
    }
}
