//! Application configuration options

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::errors::CamError;
use crate::settings::{CameraSettings, Settings};
use crate::utils::CooldownOptions;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Viewing endpoint configuration
    pub server: ServerOptions,

    /// Enable the viewing endpoint
    pub enable_server: bool,

    /// Root of the picture tree
    pub pictures_root: PathBuf,

    /// Timezone for storage timestamps
    pub timezone: Tz,

    /// Camera name -> capture configuration
    pub cameras: HashMap<String, CameraSettings>,

    /// Delay between consecutive camera starts
    pub start_stagger: Duration,

    /// Respawn backoff for crashed capture loops
    pub watchdog_backoff: CooldownOptions,

    /// A loop stable for this long gets its failure counter reset
    pub watchdog_reset: Duration,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            enable_server: true,
            pictures_root: PathBuf::from("/var/lib/stillcam/photos"),
            timezone: Tz::UTC,
            cameras: HashMap::new(),
            start_stagger: Duration::from_secs(3),
            watchdog_backoff: CooldownOptions::default(),
            watchdog_reset: Duration::from_secs(90),
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

impl AppOptions {
    /// Build runtime options from the settings file.
    pub fn from_settings(settings: &Settings) -> Result<Self, CamError> {
        let timezone: Tz = settings.global.timezone.parse().map_err(|e| {
            CamError::ConfigError(format!(
                "invalid timezone {:?}: {}",
                settings.global.timezone, e
            ))
        })?;

        Ok(Self {
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            enable_server: settings.server.enabled,
            pictures_root: settings.global.pictures_dir.clone(),
            timezone,
            cameras: settings.cameras.clone(),
            ..Default::default()
        })
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
