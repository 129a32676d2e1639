//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop, probe and announcer produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Speaker / journal capture of stderr
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Nothing observability-related ever touches stdout
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
