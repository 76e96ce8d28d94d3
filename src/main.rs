//! Service Watch Binary

use clap::Parser;
use service_watch::{Config, LogSink, MonitorSet, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "service_watch", about = "Notifies on service availability changes")]
struct Args {
    /// Path to the JSON file listing services to monitor
    #[arg(long, env = "SERVICE_WATCH_CONFIG", default_value = "services.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    initialize_tracing();

    let args = Args::parse();

    info!("Starting Service Watch v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {:?}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let monitors = MonitorSet::new();
    let sink = Arc::new(LogSink);

    for service in config.services {
        info!(
            service = %service.name,
            address = %service.address,
            "Registering service"
        );
        monitors.start(service, sink.clone())?;
    }

    info!("Watching {} services, press ctrl-c to exit", monitors.len());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| service_watch::MonitorError::Other(format!(
            "Failed to wait for shutdown signal: {}",
            e
        )))?;

    info!("Shutting down");
    monitors.stop_all();

    Ok(())
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
