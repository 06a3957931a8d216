//! Region latency service entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use region_latency::api::{create_router, AppState};
use region_latency::config::{Config, VERBOSE_LOG_DIRECTIVE};
use region_latency::error::ServiceError;
use region_latency::telemetry::{Aggregator, Dataset};
use region_latency::utils::shutdown_signal;

/// Region latency telemetry aggregation service.
#[derive(Parser, Debug)]
#[command(name = "region-latency")]
#[command(about = "Serve per-region latency and uptime statistics over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Telemetry JSON file.
    #[arg(short, long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the latency API (default).
    Serve {
        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,

        /// Telemetry JSON file.
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Load the telemetry file and summarize it.
    CheckData {
        /// Telemetry JSON file.
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Compute region statistics once and print them as JSON.
    Compute {
        /// Region to report on (repeatable).
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Breach threshold in milliseconds.
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        threshold: f64,

        /// Telemetry JSON file.
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration first so RUST_LOG and VERBOSE from .env shape logging
    let loaded = Config::load();

    // Initialize logging
    let directive = match &loaded {
        Ok(config) => config.log_directive(args.verbose),
        Err(_) if args.verbose => VERBOSE_LOG_DIRECTIVE,
        Err(_) => "info",
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port, data }) => cmd_serve(loaded, port, data).await,
        Some(Command::CheckConfig) => cmd_check_config(loaded),
        Some(Command::CheckData { data }) => cmd_check_data(loaded, data),
        Some(Command::Compute {
            regions,
            threshold,
            data,
        }) => cmd_compute(loaded, regions, threshold, data),
        None => cmd_serve(loaded, args.port, args.data).await,
    }
}

/// Apply CLI overrides to the loaded configuration and validate it.
fn resolve_config(
    loaded: Result<Config, ServiceError>,
    port: Option<u16>,
    data: Option<PathBuf>,
) -> anyhow::Result<Config> {
    let mut config = loaded.inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data) = data {
        config.telemetry_path = data;
    }

    config.validate()?;
    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(loaded: Result<Config, ServiceError>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("REGION LATENCY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Telemetry Path: {}", config.telemetry_path.display());
    println!("  Bind: {}:{}", config.host, config.port);
    println!("  Metrics: {}", if config.enable_metrics { "Enabled" } else { "Disabled" });
    println!("  Log Level: {}", config.rust_log);
    println!("  Verbose: {}", config.verbose);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Load the telemetry file and print a per-region summary.
fn cmd_check_data(loaded: Result<Config, ServiceError>, data: Option<PathBuf>) -> anyhow::Result<()> {
    let config = resolve_config(loaded, None, data)?;

    println!("======================================================================");
    println!("REGION LATENCY - DATA CHECK");
    println!("======================================================================");

    print!("Loading {}... ", config.telemetry_path.display());
    let dataset = match Dataset::load(&config.telemetry_path) {
        Ok(d) => {
            println!("OK");
            d
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(ServiceError::from(e).into());
        }
    };

    println!("----------------------------------------------------------------------");
    println!("  Records: {}", dataset.len());
    for region in dataset.regions() {
        println!("  - {}: {} records", region, dataset.for_region(region).count());
    }
    println!("======================================================================");
    println!("DATA CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run a single aggregation and print the result.
fn cmd_compute(
    loaded: Result<Config, ServiceError>,
    regions: Vec<String>,
    threshold: f64,
    data: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = resolve_config(loaded, None, data)?;
    let dataset = Dataset::load(&config.telemetry_path).map_err(ServiceError::from)?;

    let aggregator = Aggregator::new(Arc::new(dataset));
    let result = aggregator.compute(&regions, threshold);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Serve the latency API until a shutdown signal arrives.
async fn cmd_serve(
    loaded: Result<Config, ServiceError>,
    port: Option<u16>,
    data: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = resolve_config(loaded, port, data)?;

    // The dataset must load before the listener binds
    info!("Loading telemetry from {}", config.telemetry_path.display());
    let app_state = AppState::from_config(&config)
        .inspect_err(|e| error!("Failed to load telemetry: {}", e))?;

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
