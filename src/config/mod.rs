//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (VIPs, --health-url)
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//!     → read once to build the control loop
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError, DEFAULT_CONFIG_PATH};
pub use schema::{
    AnnouncerConfig, ChannelConfig, ControllerConfig, HealthConfig, LogFormat,
    ObservabilityConfig, RouteConfig,
};
pub use validation::{validate_config, ValidationError};
