//! Health-driven anycast route controller.
//!
//! Probes a local service, debounces the results per route and tells a BGP
//! speaker to announce or withdraw the service VIPs over its text API.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── anycast-controller ─────────────────────────────┐
//!   │                                                                              │
//!   │   timer ──▶ controller ──▶ health::probe ──▶ health::state ──▶ bgp::announcer ┼──▶ speaker
//!   │              (tick)        (HTTP GET)        (debounce)        (stdout/pipe)   │    (stdin)
//!   │                ▲                                                             │
//!   │                │ shutdown                                                    │
//!   │   lifecycle::signals (SIGTERM/SIGINT) ──▶ drain: withdraw announced routes   │
//!   │                                                                              │
//!   │   config (TOML) · observability (tracing to stderr, metrics)                 │
//!   └──────────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bgp;
pub mod config;
pub mod controller;
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ControllerConfig;
pub use controller::{ControlLoop, ControllerError};
pub use lifecycle::Shutdown;
