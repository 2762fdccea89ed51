//! Configuration types for the device status service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::format::SignalRange;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server-sent event endpoint published by the device
    #[serde(default = "default_url")]
    pub url: String,
    /// Name of the event carrying the status payload
    #[serde(default = "default_event_name")]
    pub event_name: String,
    /// Reconnection delay until the server sends its own `retry:`
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,
    #[serde(default)]
    pub signal_range: SignalRange,
    /// Events buffered between the transport task and the binder
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            event_name: default_event_name(),
            retry_ms: default_retry_ms(),
            signal_range: SignalRange::default(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Config {
    /// Reject values the binder cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.trim().is_empty() {
            return Err(crate::DeviceStatusError::Config(
                "url must not be empty".to_string(),
            ));
        }
        if self.event_name.is_empty() {
            return Err(crate::DeviceStatusError::Config(
                "event_name must not be empty".to_string(),
            ));
        }
        if self.signal_range.max_dbm <= self.signal_range.min_dbm {
            return Err(crate::DeviceStatusError::Config(format!(
                "signal_range.max_dbm ({}) must be greater than signal_range.min_dbm ({})",
                self.signal_range.max_dbm, self.signal_range.min_dbm
            )));
        }
        if self.channel_capacity == 0 {
            return Err(crate::DeviceStatusError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "http://localhost/events".to_string()
}

fn default_event_name() -> String {
    "deviceStatus".to_string()
}

fn default_retry_ms() -> u64 {
    3000
}

fn default_channel_capacity() -> usize {
    100
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DeviceStatusError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
