//! Device Status - robot telemetry event stream subscriber
//!
//! Subscribes to the server-sent event stream of an IoT robot monitor and
//! renders clock, SSID, signal strength and supply voltage to a display.

pub mod binder;
pub mod config;
pub mod display;
pub mod error;
pub mod event_source;
pub mod format;
pub mod io;
pub mod message;
pub mod sse;

pub use binder::{StatusBinder, StatusHandlers};
pub use config::{load_config, Config};
pub use display::{ConsoleDisplay, Element, MemoryDisplay, StatusDisplay};
pub use error::{DeviceStatusError, Result};
pub use event_source::{EventSource, ReadyState, SourceEvent};
pub use message::DeviceStatusMessage;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::{ReqwestConnector, StreamConnector};

/// Run the device status subscriber with the given configuration
///
/// Renders to stdout until Ctrl-C or until the endpoint is rejected.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let connector: Arc<dyn StreamConnector> = Arc::new(ReqwestConnector::new());
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    let display = ConsoleDisplay::new(std::io::stdout());
    let binder = StatusBinder::new(&config, connector, display, cancel);
    tracing::info!("Subscribed to {}", binder.url());

    binder
        .init()
        .await
        .map_err(|e| DeviceStatusError::Stream(format!("Status dispatch task failed: {}", e)))?;

    tracing::info!("Device status subscriber stopped");
    Ok(())
}
