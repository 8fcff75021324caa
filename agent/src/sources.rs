//! Capture source dispatch

use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

use crate::errors::CamError;
use crate::gopro::GoProCamera;
use crate::http::fetch::SnapshotFetcher;

/// How one camera's picture is acquired.
pub enum CaptureSource {
    /// Plain GET against a snapshot URL.
    Snapshot(SnapshotFetcher),

    /// Local command whose stdout is the image.
    Command(CommandCapture),

    /// Smart camera driven through the wake/trigger/retrieve protocol.
    GoPro(GoProCamera),
}

impl CaptureSource {
    /// Acquire one picture.
    ///
    /// Absence is the only failure signal at this level. Protocol errors
    /// from smart cameras are surfaced here by the driver, logged, and
    /// mapped to absence so the loop retries on its own schedule.
    pub async fn acquire(&self, camera: &str) -> Option<Vec<u8>> {
        match self {
            CaptureSource::Snapshot(fetcher) => fetcher.fetch(camera).await,
            CaptureSource::Command(command) => command.capture(camera).await,
            CaptureSource::GoPro(gopro) => match gopro.capture_photo(None).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("{}: gopro capture failed: {}", camera, e);
                    None
                }
            },
        }
    }
}

/// Runs a local command and treats its stdout as the captured image.
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCapture {
    pub fn new(command_line: &str, timeout: Duration) -> Result<Self, CamError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CamError::ConfigError("empty capture command".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }

    /// Same absence semantics as the snapshot fetcher.
    pub async fn capture(&self, camera: &str) -> Option<Vec<u8>> {
        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program).args(&self.args).output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("{}: capture command {} failed to run: {}", camera, self.program, e);
                return None;
            }
            Err(_) => {
                warn!(
                    "{}: capture command {} timed out after {:?}",
                    camera, self.program, self.timeout
                );
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "{}: capture command {} exited with {}",
                camera, self.program, output.status
            );
            return None;
        }

        if image::guess_format(&output.stdout).is_err() {
            warn!(
                "{}: capture command {} did not produce a decodable image",
                camera, self.program
            );
            return None;
        }

        Some(output.stdout)
    }
}
