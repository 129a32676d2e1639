//! Route controller subsystem.
//!
//! # Data Flow
//! ```text
//! Timer tick
//!     → for each ControlledRoute (route.rs):
//!         HealthProbe.check(endpoint, timeout)
//!         → DebounceStateMachine.observe(result)
//!         → on transition: RouteAnnouncer.announce / withdraw
//!
//! Shutdown signal
//!     → stop waiting → drain (withdraw announced routes) → stopped
//! ```
//!
//! # Design Decisions
//! - Per-route state object instead of shared counters; routes are independent
//! - Single task, no locks: nothing is mutated concurrently
//! - Channel write failures abort the loop

pub mod control_loop;
pub mod route;

use thiserror::Error;

use crate::bgp::AnnounceError;

pub use control_loop::{ControlLoop, LoopPhase};
pub use route::ControlledRoute;

/// Fatal controller errors.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A command could not be written while running.
    #[error(transparent)]
    Announce(#[from] AnnounceError),

    /// One or more withdrawals could not be written while draining.
    #[error("failed to withdraw {failed} route(s) during drain: {source}")]
    Drain {
        failed: usize,
        #[source]
        source: AnnounceError,
    },
}
