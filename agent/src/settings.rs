//! Settings file management
//!
//! Three sections mirror the deployment's concerns: `server` for the
//! viewing endpoint, `cameras` for capture sources, `global` for storage
//! and timezone.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;
use crate::similarity::CompareArea;

/// Agent settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Viewing endpoint configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Camera name -> capture configuration
    #[serde(default)]
    pub cameras: HashMap<String, CameraSettings>,

    /// Storage and timezone configuration
    #[serde(default)]
    pub global: GlobalSettings,
}

/// Viewing endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

/// One camera's capture configuration. Exactly one of `url`, `command`,
/// `gopro` is expected; `url` wins over `command` wins over `gopro`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Snapshot URL returning raw image bytes
    #[serde(default)]
    pub url: Option<String>,

    /// Local command whose stdout is the image
    #[serde(default)]
    pub command: Option<String>,

    /// GoPro-class protocol parameters
    #[serde(default)]
    pub gopro: Option<GoProSettings>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,

    /// Fixed capture interval; disables adaptive pacing when set
    #[serde(default)]
    pub interval_s: Option<u64>,

    /// Frame region compared for pacing, `[x, y, width, height]`
    #[serde(default)]
    pub compare_area: Option<CompareArea>,

    /// Map coordinates, surfaced on the metadata endpoint
    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lon: Option<f64>,
}

fn default_timeout_s() -> u64 {
    20
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            url: None,
            command: None,
            gopro: None,
            timeout_s: default_timeout_s(),
            interval_s: None,
            compare_area: None,
            lat: None,
            lon: None,
        }
    }
}

impl CameraSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}

/// GoPro-class protocol settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoProSettings {
    /// Camera address, `host` or `host:port`
    #[serde(default = "default_gopro_ip")]
    pub ip_address: String,

    /// BLE hardware address used to wake the camera's WiFi first
    #[serde(default)]
    pub ble_address: Option<String>,

    /// PEM root certificate; switches the protocol to HTTPS
    #[serde(default)]
    pub root_ca: Option<String>,

    /// Seconds to wait for the camera to come up on the network
    #[serde(default = "default_reachability_s")]
    pub reachability_timeout_s: u64,
}

fn default_gopro_ip() -> String {
    "10.5.5.9".to_string()
}

fn default_reachability_s() -> u64 {
    30
}

impl Default for GoProSettings {
    fn default() -> Self {
        Self {
            ip_address: default_gopro_ip(),
            ble_address: None,
            root_ca: None,
            reachability_timeout_s: default_reachability_s(),
        }
    }
}

/// Storage and timezone settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// IANA timezone id used for storage timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Root directory of the picture tree
    #[serde(default = "default_pictures_dir")]
    pub pictures_dir: PathBuf,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_pictures_dir() -> PathBuf {
    PathBuf::from("/var/lib/stillcam/photos")
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            pictures_dir: default_pictures_dir(),
        }
    }
}
