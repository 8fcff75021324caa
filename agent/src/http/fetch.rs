//! Plain snapshot fetching

use std::time::Duration;

use reqwest::Client;
use tracing::warn;
use url::Url;

use crate::errors::CamError;

/// Fetches stills from cameras that expose a plain snapshot URL.
///
/// Absence is the only failure signal: a camera that is offline for a
/// moment must not take its capture loop down with it.
pub struct SnapshotFetcher {
    client: Client,
    url: Url,
}

impl SnapshotFetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CamError> {
        let url = Url::parse(url)
            .map_err(|e| CamError::ConfigError(format!("invalid snapshot url {}: {}", url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One GET, no retry. `None` on any transport failure, error status,
    /// or a body that is not an image.
    pub async fn fetch(&self, camera: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(self.url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}: could not fetch picture from {}: {}", camera, self.url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("{}: {} answered {}", camera, self.url, response.status());
            return None;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}: failed reading body from {}: {}", camera, self.url, e);
                return None;
            }
        };

        if image::guess_format(&bytes).is_err() {
            warn!("{}: body from {} is not a decodable image", camera, self.url);
            return None;
        }

        Some(bytes.to_vec())
    }
}
