//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file, default path, command-line overrides)
//! - Validate before anything else happens
//! - Build the probe, open the command channel, assemble the control loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Config errors and channel errors map to distinct exit codes

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::bgp::{open_channel, CommandChannel, RouteAnnouncer};
use crate::config::loader::{read_config, ConfigError, DEFAULT_CONFIG_PATH};
use crate::config::schema::{ControllerConfig, RouteConfig};
use crate::config::validation::validate_config;
use crate::controller::ControlLoop;
use crate::health::HttpProbe;

/// Exit code for an invalid configuration.
pub const EXIT_CONFIG: u8 = 1;

/// Exit code for a command channel failure.
pub const EXIT_CHANNEL: u8 = 2;

/// The control loop as wired by the binary.
pub type Controller = ControlLoop<HttpProbe, CommandChannel>;

/// Errors that prevent the control loop from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build health probe client: {0}")]
    Probe(#[from] reqwest::Error),

    #[error("failed to open command channel: {0}")]
    Channel(#[source] io::Error),
}

impl StartupError {
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Config(_) | StartupError::Probe(_) => EXIT_CONFIG,
            StartupError::Channel(_) => EXIT_CHANNEL,
        }
    }
}

/// Command-line values layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Routes to control; replaces the file's routes when non-empty.
    pub vips: Vec<String>,

    /// Health URL for every route without its own override.
    pub health_url: Option<String>,

    /// Probe timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Resolve the effective configuration. Does not validate.
///
/// An explicit `path` must exist. Without one, the default path is used if
/// present, built-in defaults otherwise.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<ControllerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                ControllerConfig::default()
            }
        }
    };

    if !overrides.vips.is_empty() {
        config.routes = overrides.vips.iter().map(RouteConfig::new).collect();
    }
    if let Some(url) = &overrides.health_url {
        config.health.url = url.clone();
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.health.timeout_ms = timeout_ms;
    }

    Ok(config)
}

/// Validate `config` and assemble the production control loop.
pub async fn build_controller(config: &ControllerConfig) -> Result<Controller, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let probe = HttpProbe::new()?;
    let channel = open_channel(&config.announcer.channel)
        .await
        .map_err(StartupError::Channel)?;
    let controller = ControlLoop::from_config(config, probe, RouteAnnouncer::new(channel))?;

    for route in controller.routes() {
        tracing::info!(
            route = %route.spec(),
            endpoint = %route.endpoint(),
            "Controlling route"
        );
    }

    Ok(controller)
}
