//! anycast-controller binary.
//!
//! Typically spawned by the BGP speaker as an API process:
//!
//! ```text
//! process vip-health {
//!     run /usr/local/bin/anycast-controller run --config /etc/anycast-controller/controller.toml;
//!     encoder text;
//! }
//! ```
//!
//! Route commands go to stdout; all logging goes to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use anycast_controller::config::schema::ObservabilityConfig;
use anycast_controller::config::validation::parse_health_url;
use anycast_controller::config::{load_config, ConfigError, ControllerConfig};
use anycast_controller::controller::ControlledRoute;
use anycast_controller::health::{HealthCheck, HttpProbe};
use anycast_controller::lifecycle::signals::spawn_signal_listener;
use anycast_controller::lifecycle::startup::{
    build_controller, resolve_config, Overrides, EXIT_CHANNEL, EXIT_CONFIG,
};
use anycast_controller::lifecycle::Shutdown;
use anycast_controller::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "anycast-controller", version)]
#[command(about = "Announce anycast VIPs over BGP while the local service is healthy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop, writing route commands to the command channel
    Run(RunArgs),
    /// Probe the health endpoint once and print the result as JSON
    Probe(ProbeArgs),
    /// Validate a configuration file and print the routes it controls
    CheckConfig(CheckConfigArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Health endpoint URL, overrides the config file
    #[arg(long)]
    health_url: Option<String>,

    /// VIPs to control (CIDR or bare address), replace the config file's routes
    vips: Vec<String>,
}

#[derive(Args)]
struct ProbeArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Health endpoint URL, overrides the config file
    #[arg(long)]
    health_url: Option<String>,

    /// Probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Args)]
struct CheckConfigArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Probe(args) => probe(args).await,
        Commands::CheckConfig(args) => check_config(args),
    }
}

/// Initialize logging from the resolved config, or defaults if it failed.
fn init_logging(config: &Result<ControllerConfig, ConfigError>) {
    match config {
        Ok(config) => logging::init_logging(&config.observability),
        Err(_) => logging::init_logging(&ObservabilityConfig::default()),
    }
}

async fn run(args: RunArgs) -> ExitCode {
    let overrides = Overrides {
        vips: args.vips,
        health_url: args.health_url,
        timeout_ms: None,
    };
    let resolved = resolve_config(args.config.as_deref(), &overrides);
    init_logging(&resolved);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "anycast-controller starting");

    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let controller = match build_controller(&config).await {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::from(e.exit_code());
        }
    };

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let _signals = spawn_signal_listener(shutdown);

    match controller.run(shutdown_rx).await {
        Ok(_) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command channel failed, exiting");
            ExitCode::from(EXIT_CHANNEL)
        }
    }
}

async fn probe(args: ProbeArgs) -> ExitCode {
    let overrides = Overrides {
        vips: Vec::new(),
        health_url: args.health_url,
        timeout_ms: args.timeout_ms,
    };
    let resolved = resolve_config(args.config.as_deref(), &overrides);
    init_logging(&resolved);

    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let endpoint = match parse_health_url(&config.health.url) {
        Ok(endpoint) => endpoint,
        Err(reason) => {
            tracing::error!(url = %config.health.url, reason = %reason, "Invalid health URL");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if config.health.timeout_ms == 0 {
        tracing::error!("Probe timeout must be greater than zero");
        return ExitCode::from(EXIT_CONFIG);
    }

    let probe = match HttpProbe::new() {
        Ok(probe) => probe,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build health probe client");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = probe.check(&endpoint, config.health.probe_timeout()).await;
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Failed to encode probe result"),
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn check_config(args: CheckConfigArgs) -> ExitCode {
    let loaded = load_config(&args.config);
    init_logging(&loaded);

    let config = match loaded {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                eprintln!("error: {}", error);
            }
            return ExitCode::from(EXIT_CONFIG);
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    for route in &config.routes {
        let thresholds = config.health.thresholds_for(route);
        match ControlledRoute::from_config(route, &config.health) {
            Ok(controlled) => println!(
                "{}\t{}\tsuccess_threshold={}\tfailure_threshold={}",
                controlled.spec(),
                controlled.endpoint(),
                thresholds.success_threshold,
                thresholds.failure_threshold
            ),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(EXIT_CONFIG);
            }
        }
    }
    println!(
        "ok: {} route(s), interval {}ms, timeout {}ms",
        config.routes.len(),
        config.health.interval_ms,
        config.health.timeout_ms
    );
    ExitCode::SUCCESS
}
