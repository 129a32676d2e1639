//! BGP speaker control-plane subsystem.
//!
//! # Data Flow
//! ```text
//! Route config (prefix string)
//!     → route.rs (parse & normalise into RouteSpec)
//!
//! State transition detected:
//!     → command.rs (render `announce|withdraw route <CIDR> next-hop self`)
//!     → announcer.rs (write one line, flush)
//!     → speaker process reads the command channel
//! ```
//!
//! # Design Decisions
//! - The speaker implements BGP; this side only emits text commands
//! - One command per line, flushed immediately, never batched across ticks
//! - The command channel carries nothing but commands (logs go to stderr)
//! - Write failures are fatal to the caller

pub mod announcer;
pub mod command;
pub mod route;

pub use announcer::{open_channel, AnnounceError, CommandChannel, RouteAnnouncer};
pub use command::{RouteAction, RouteCommand};
pub use route::{Prefix, RouteSpec, RouteSpecError};
