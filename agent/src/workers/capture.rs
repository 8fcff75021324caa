//! Per-camera adaptive capture worker
//!
//! Owns one camera's loop state exclusively: the previous capture and the
//! current interval. A missed fetch never changes the pace (there is
//! nothing new to compare against); a successful one re-derives it from
//! the similarity of the last two frames.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::pacing::PacingPolicy;
use crate::similarity::{similarity_score, CompareArea};
use crate::sources::CaptureSource;
use crate::storage::layout::CaptureLayout;

/// Capture worker options
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Fixed interval; disables adaptive pacing when set
    pub fixed_interval: Option<Duration>,

    /// Adaptive pacing policy
    pub pacing: PacingPolicy,

    /// Frame region used for comparison
    pub compare_area: Option<CompareArea>,
}

/// Run the capture worker for one camera until the shutdown signal fires.
pub async fn run<S, F>(
    options: &Options,
    camera: &str,
    source: Arc<CaptureSource>,
    layout: Arc<CaptureLayout>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("{}: capture worker starting...", camera);

    let mut interval = options.fixed_interval.unwrap_or(options.pacing.fallback);

    // First capture: keep trying at the current interval until the camera
    // answers once.
    let mut previous = loop {
        match source.acquire(camera).await {
            Some(bytes) => break bytes,
            None => {
                warn!("{}: no initial picture, retrying in {:?}", camera, interval);
                tokio::select! {
                    _ = &mut shutdown_signal => {
                        info!("{}: capture worker shutting down...", camera);
                        return;
                    }
                    _ = sleep_fn(interval) => {}
                }
            }
        }
    };
    persist(camera, &layout, &previous).await;

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("{}: capture worker shutting down...", camera);
                return;
            }
            _ = sleep_fn(interval) => {}
        }

        let current = match source.acquire(camera).await {
            Some(bytes) => bytes,
            None => {
                // Transient: nothing to compare, so the pace stands.
                warn!(
                    "{}: no picture this round, keeping interval at {:?}",
                    camera, interval
                );
                continue;
            }
        };

        if options.fixed_interval.is_none() {
            let score = similarity_score(&previous, &current, options.compare_area);
            interval = options.pacing.interval_for(score);
            debug!(
                "{}: similarity {:?}, next interval {:?}",
                camera, score, interval
            );
        }

        persist(camera, &layout, &current).await;
        previous = current;
    }
}

/// Write one capture under its timestamp path and repoint `latest.jpg`.
/// Storage trouble is logged, not fatal: the loop keeps its state and the
/// next capture tries again.
async fn persist(camera: &str, layout: &CaptureLayout, bytes: &[u8]) {
    let at = layout.now();
    let file = layout.capture_file(camera, &at);

    if let Err(e) = file.write_bytes(bytes).await {
        warn!("{}: failed to write {}: {}", camera, file.path().display(), e);
        return;
    }
    debug!("{}: saved {}", camera, file.path().display());

    if let Err(e) = layout.update_latest_link(camera, &file).await {
        debug!("{}: could not update latest link: {}", camera, e);
    }
}
