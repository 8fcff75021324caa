//! Main application run loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::app::options::AppOptions;
use crate::errors::CamError;
use crate::gopro::{GoProCamera, GoProOptions};
use crate::hardware::ble::default_radio;
use crate::http::fetch::SnapshotFetcher;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::settings::CameraSettings;
use crate::sources::{CaptureSource, CommandCapture};
use crate::storage::layout::CaptureLayout;
use crate::utils::{calc_exp_backoff, CooldownOptions};
use crate::workers::capture;

/// Run the stillcam agent until the shutdown signal fires.
pub async fn run(
    agent_version: String,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CamError> {
    info!("Initializing stillcam agent v{}...", agent_version);

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.max_shutdown_delay);

    if let Err(e) = init(&options, shutdown_tx.clone(), &mut shutdown_manager).await {
        error!("Failed to start agent: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), CamError> {
    if options.cameras.is_empty() {
        return Err(CamError::ConfigError("no cameras configured".to_string()));
    }

    let layout = Arc::new(CaptureLayout::new(&options.pictures_root, options.timezone));

    if options.enable_server {
        let state = ServerState::new(&options.cameras, options.pictures_root.clone());
        let mut shutdown_rx = shutdown_tx.subscribe();
        let handle = serve(&options.server, Arc::new(state), async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;
        shutdown_manager.with_server_handle(handle)?;
    }

    // Deterministic start order; the stagger keeps first fetches apart.
    let mut names: Vec<&String> = options.cameras.keys().collect();
    names.sort();

    for (position, name) in names.into_iter().enumerate() {
        let settings = &options.cameras[name];
        let task = CameraTask {
            name: name.clone(),
            options: capture::Options {
                fixed_interval: settings.interval_s.map(Duration::from_secs),
                pacing: Default::default(),
                compare_area: settings.compare_area,
            },
            source: Arc::new(build_source(name, settings)?),
            layout: layout.clone(),
        };

        info!("Starting capture worker for {}...", name);
        let handle = tokio::spawn(supervise(
            task,
            options.start_stagger * position as u32,
            options.watchdog_backoff.clone(),
            options.watchdog_reset,
            shutdown_tx.clone(),
        ));
        shutdown_manager.with_camera_handle(handle);
    }

    Ok(())
}

/// Choose the capture method for a camera; a URL wins over a local
/// command, which wins over a smart-camera protocol.
fn build_source(name: &str, settings: &CameraSettings) -> Result<CaptureSource, CamError> {
    if let Some(url) = &settings.url {
        return Ok(CaptureSource::Snapshot(SnapshotFetcher::new(
            url,
            settings.timeout(),
        )?));
    }

    if let Some(command) = &settings.command {
        return Ok(CaptureSource::Command(CommandCapture::new(
            command,
            settings.timeout(),
        )?));
    }

    if let Some(gopro) = &settings.gopro {
        let camera = GoProCamera::new(
            GoProOptions {
                ip_address: gopro.ip_address.clone(),
                timeout: settings.timeout(),
                reachability_timeout: Duration::from_secs(gopro.reachability_timeout_s),
                root_ca: gopro.root_ca.clone(),
                ble_address: gopro.ble_address.clone(),
            },
            default_radio(),
        )?;
        return Ok(CaptureSource::GoPro(camera));
    }

    Err(CamError::ConfigError(format!(
        "camera {} has no url, command, or gopro section",
        name
    )))
}

// ================================= SUPERVISION =================================== //

struct CameraTask {
    name: String,
    options: capture::Options,
    source: Arc<CaptureSource>,
    layout: Arc<CaptureLayout>,
}

/// Keep one camera's capture loop alive: start it after its stagger delay
/// and respawn it with exponential backoff if it ever dies. A loop that
/// stays up past the reset window earns its failure counter back.
async fn supervise(
    task: CameraTask,
    start_delay: Duration,
    backoff: CooldownOptions,
    failure_reset: Duration,
    shutdown_tx: broadcast::Sender<()>,
) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        _ = shutdown_rx.recv() => return,
        _ = tokio::time::sleep(start_delay) => {}
    }

    let mut failures: u32 = 0;
    let mut last_failure = Instant::now();

    loop {
        let worker = {
            let name = task.name.clone();
            let options = task.options.clone();
            let source = task.source.clone();
            let layout = task.layout.clone();
            let mut worker_shutdown = shutdown_tx.subscribe();
            tokio::spawn(async move {
                capture::run(
                    &options,
                    &name,
                    source,
                    layout,
                    tokio::time::sleep,
                    Box::pin(async move {
                        let _ = worker_shutdown.recv().await;
                    }),
                )
                .await;
            })
        };

        match worker.await {
            // The worker only returns on shutdown.
            Ok(()) => return,
            Err(e) => {
                if last_failure.elapsed() > failure_reset {
                    failures = 0;
                }
                last_failure = Instant::now();
                let delay = calc_exp_backoff(&backoff, failures);
                failures += 1;
                warn!(
                    "{}: capture loop died ({}), restarting in {:?}",
                    task.name, e, delay
                );
                tokio::select! {
                    _ = shutdown_rx.recv() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    server_handle: Option<JoinHandle<Result<(), CamError>>>,
    camera_handles: Vec<JoinHandle<()>>,
}

impl ShutdownManager {
    fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            server_handle: None,
            camera_handles: Vec::new(),
        }
    }

    fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), CamError>>,
    ) -> Result<(), CamError> {
        if self.server_handle.is_some() {
            return Err(CamError::ShutdownError(
                "server_handle already set".to_string(),
            ));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    fn with_camera_handle(&mut self, handle: JoinHandle<()>) {
        self.camera_handles.push(handle);
    }

    async fn shutdown(&mut self) -> Result<(), CamError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), CamError> {
        info!("Shutting down stillcam agent...");

        // 1. Capture workers
        for handle in self.camera_handles.drain(..) {
            handle
                .await
                .map_err(|e| CamError::ShutdownError(e.to_string()))?;
        }

        // 2. HTTP server
        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| CamError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
