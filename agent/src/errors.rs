//! Error types for the stillcam agent

use std::time::Duration;

use thiserror::Error;

/// Main error type for the stillcam agent
#[derive(Error, Debug)]
pub enum CamError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Hardware error: {0}")]
    HardwareError(String),

    /// The camera never answered on its capture port.
    #[error("device {address} unreachable after {waited:?}")]
    DeviceUnreachable { address: String, waited: Duration },

    /// An HTTP stage of the capture protocol answered with an error status.
    #[error("request to {url} failed with status {status}")]
    RequestFailed {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The camera's media index contained no directories.
    #[error("camera reported no media directories")]
    NoMediaFound,

    /// The newest media directory contained no files.
    #[error("media directory {directory} contains no files")]
    NoFilesFound { directory: String },
}
