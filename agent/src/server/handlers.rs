//! HTTP request handlers

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::server::state::ServerState;
use crate::telemetry::{collect_snapshot, SystemSnapshot};
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "stillcam".to_string(),
        version: version_info().version,
    })
}

/// Camera metadata handler
pub async fn cameras_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.cameras.clone())
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub cameras: usize,
    pub system: SystemSnapshot,
}

/// Status handler
pub async fn status_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(StatusResponse {
        version: version_info().version,
        cameras: state.cameras.len(),
        system: collect_snapshot(&state.pictures_root),
    })
}
