//! Capture storage layout
//!
//! One directory per camera, one day-bucket per local calendar day,
//! filenames carrying the full local timestamp with timezone. Paths are
//! distinct per capture second, so a day-bucket sorts chronologically by
//! name.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::errors::CamError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Per-camera pointer to the newest capture.
const LATEST_LINK: &str = "latest.jpg";
/// Scratch name the pointer is created under before the rename.
const LATEST_LINK_TMP: &str = "new.jpg";

/// Derives storage paths for captures.
///
/// Timezone and root directory are injected here once; nothing reads
/// process-wide state.
#[derive(Debug, Clone)]
pub struct CaptureLayout {
    root: PathBuf,
    timezone: Tz,
}

impl CaptureLayout {
    pub fn new(root: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            root: root.into(),
            timezone,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current moment in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn camera_dir(&self, camera: &str) -> Dir {
        Dir::new(self.root.join(camera))
    }

    /// Day-bucket for the local calendar day of `at`.
    pub fn day_dir(&self, camera: &str, at: &DateTime<Tz>) -> Dir {
        self.camera_dir(camera)
            .subdir(&at.format("%Y-%m-%d").to_string())
    }

    /// Path for a capture taken at `at`. Deterministic: the same camera,
    /// moment, timezone and root always yield the same path.
    pub fn capture_file(&self, camera: &str, at: &DateTime<Tz>) -> File {
        self.day_dir(camera, at)
            .file(&at.format("%Y-%m-%dT%H-%M-%S%Z.jpg").to_string())
    }

    /// Point `<camera>/latest.jpg` at the given capture. The link is
    /// created under a scratch name and renamed into place so readers
    /// never observe a dangling pointer. No-op off unix.
    pub async fn update_latest_link(&self, camera: &str, capture: &File) -> Result<(), CamError> {
        #[cfg(unix)]
        {
            let camera_dir = self.camera_dir(camera);
            let relative = capture
                .path()
                .strip_prefix(camera_dir.path())
                .map_err(|_| {
                    CamError::StorageError(format!(
                        "capture {} is outside its camera directory",
                        capture.path().display()
                    ))
                })?
                .to_path_buf();

            let scratch = camera_dir.file(LATEST_LINK_TMP);
            scratch.delete().await?;
            tokio::fs::symlink(&relative, scratch.path()).await?;
            tokio::fs::rename(scratch.path(), camera_dir.file(LATEST_LINK).path()).await?;
        }
        #[cfg(not(unix))]
        {
            let _ = (camera, capture);
        }
        Ok(())
    }
}
