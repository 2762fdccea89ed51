//! Error types for the device status service

/// Errors that can occur while subscribing to and rendering device status
#[derive(Debug, thiserror::Error)]
pub enum DeviceStatusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Display element '{0}' not found")]
    MissingElement(String),

    #[error("Event stream error: {0}")]
    Stream(String),
}

/// Result type alias for device status operations
pub type Result<T> = std::result::Result<T, DeviceStatusError>;
