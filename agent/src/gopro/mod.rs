//! GoPro-class capture protocol
//!
//! Drives a camera's local HTTP API through a fixed sequence: optional BLE
//! wake, reachability poll, control-mode and preset configuration, shutter
//! trigger, settle pause, media listing, download of the newest file.
//! Stages run strictly in order; the first failing stage aborts the whole
//! attempt and the caller decides when to try again.

pub mod media;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::CamError;
use crate::filesys::file::File;
use crate::hardware::ble::WakeRadio;
use self::media::MediaList;

/// Setting that switches the camera into an externally controllable mode.
const CONTROL_MODE_SETTING_ID: u32 = 175;
const CONTROL_MODE_PRO: u32 = 1;

/// Photo preset selected before triggering.
const PHOTO_PRESET_ID: u32 = 65539;

/// Pause after the shutter so the camera finishes writing the new file
/// before the media index is queried.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

const PROBE_INTERVAL: Duration = Duration::from_secs(1);
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct GoProOptions {
    /// Camera address, `host` or `host:port`.
    pub ip_address: String,

    /// Per-request timeout shared by every HTTP stage.
    pub timeout: Duration,

    /// Deadline for the camera to come up on the network after wake.
    pub reachability_timeout: Duration,

    /// PEM root certificate; forces HTTPS end-to-end when present.
    pub root_ca: Option<String>,

    /// BLE hardware address used to wake the camera's WiFi.
    pub ble_address: Option<String>,
}

impl Default for GoProOptions {
    fn default() -> Self {
        Self {
            ip_address: "10.5.5.9".to_string(),
            timeout: Duration::from_secs(5),
            reachability_timeout: Duration::from_secs(30),
            root_ca: None,
            ble_address: None,
        }
    }
}

/// Driver for one GoPro-class camera.
pub struct GoProCamera {
    options: GoProOptions,
    client: reqwest::Client,
    scheme: &'static str,
    radio: Option<Arc<dyn WakeRadio>>,
}

impl GoProCamera {
    /// Build the driver. A supplied root certificate is held in memory and
    /// installed into the client's trust store; no file is ever written
    /// for it.
    pub fn new(
        options: GoProOptions,
        radio: Option<Arc<dyn WakeRadio>>,
    ) -> Result<Self, CamError> {
        let mut builder = reqwest::Client::builder().timeout(options.timeout);
        let scheme = match &options.root_ca {
            Some(pem) => {
                let certificate = reqwest::Certificate::from_pem(pem.as_bytes())?;
                builder = builder.add_root_certificate(certificate).use_rustls_tls();
                "https"
            }
            None => "http",
        };
        let client = builder.build()?;
        Ok(Self {
            options,
            client,
            scheme,
            radio,
        })
    }

    fn port(&self) -> u16 {
        if self.options.root_ca.is_some() {
            443
        } else {
            80
        }
    }

    fn socket_addr(&self) -> String {
        if self.options.ip_address.contains(':') {
            self.options.ip_address.clone()
        } else {
            format!("{}:{}", self.options.ip_address, self.port())
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.options.ip_address, path)
    }

    /// Capture one photo: trigger the shutter and download the newest file
    /// from the camera's storage. If `output` is given, the bytes are also
    /// written there.
    pub async fn capture_photo(&self, output: Option<&File>) -> Result<Vec<u8>, CamError> {
        // Best effort: a host without a radio must still be able to
        // capture, so the answer is ignored.
        if let (Some(radio), Some(address)) = (&self.radio, &self.options.ble_address) {
            if let Err(e) = radio.enable_networking(address).await {
                debug!("ble wake of {} failed, continuing: {}", address, e);
            }
        }

        self.await_reachability().await?;

        self.post(
            "/api/v1/camera/setting",
            Some(json!({ "setting_id": CONTROL_MODE_SETTING_ID, "value": CONTROL_MODE_PRO })),
        )
        .await?;
        self.post(
            "/api/v1/camera/preset",
            Some(json!({ "preset_id": PHOTO_PRESET_ID })),
        )
        .await?;
        self.post("/api/v1/command/shutter", None).await?;

        tokio::time::sleep(SETTLE_DELAY).await;

        let index = self.media_index().await?;
        let (directory, filename) = media::latest(&index)?;
        let bytes = self.download(directory, filename).await?;

        if let Some(file) = output {
            file.write_bytes(&bytes).await?;
        }
        Ok(bytes)
    }

    /// Probe TCP connectivity once per second until the camera answers or
    /// the deadline passes. No protocol request is issued before this
    /// succeeds.
    async fn await_reachability(&self) -> Result<(), CamError> {
        let address = self.socket_addr();
        let deadline = Instant::now() + self.options.reachability_timeout;

        while Instant::now() < deadline {
            match tokio::time::timeout(PROBE_CONNECT_TIMEOUT, TcpStream::connect(&address)).await {
                Ok(Ok(_)) => {
                    debug!("camera reachable at {}", address);
                    return Ok(());
                }
                Ok(Err(_)) | Err(_) => {}
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }

        Err(CamError::DeviceUnreachable {
            address,
            waited: self.options.reachability_timeout,
        })
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<(), CamError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(CamError::RequestFailed {
                url,
                status: response.status(),
            });
        }
        Ok(())
    }

    async fn media_index(&self) -> Result<Vec<media::MediaDirectory>, CamError> {
        let url = self.url("/api/v1/media/list");
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CamError::RequestFailed {
                url,
                status: response.status(),
            });
        }

        let list: MediaList = response.json().await?;
        Ok(list.normalize())
    }

    async fn download(&self, directory: &str, filename: &str) -> Result<Vec<u8>, CamError> {
        let url = self.url(&format!("/api/v1/media/{}/{}", directory, filename));
        info!("downloading {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CamError::RequestFailed {
                url,
                status: response.status(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
