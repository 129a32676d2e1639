//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Open command channel → Build probe → Build control loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Control loop stops waiting → Drain (withdraw) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, the loop never starts
//! - A signal interrupts the wait between ticks, never an in-flight probe
//! - Announced routes are withdrawn before the channel is released

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
