//! Device Status CLI
//!
//! Command-line interface for the robot telemetry event stream subscriber.

use std::path::PathBuf;

use clap::Parser;
use device_status::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "device-status")]
#[command(about = "Render robot device status from a server-sent event stream")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event stream URL (overrides config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, url={:?}, log_level={:?}",
        args.config,
        args.url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(url) = args.url {
        config.url = url;
    }

    tracing::info!("Starting device status subscriber");
    tracing::debug!(
        "Event: {}, retry: {} ms, signal range: {} to {} dBm",
        config.event_name,
        config.retry_ms,
        config.signal_range.min_dbm,
        config.signal_range.max_dbm
    );

    device_status::run(config).await?;

    Ok(())
}
