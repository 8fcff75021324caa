//! Server state

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::settings::CameraSettings;

/// Public metadata for one camera, consumed by map/viewer frontends.
#[derive(Debug, Clone, Serialize)]
pub struct CameraInfo {
    pub title: String,
    pub url: String,
    pub image: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Shared state for HTTP handlers
pub struct ServerState {
    pub cameras: Vec<CameraInfo>,
    pub pictures_root: PathBuf,
}

impl ServerState {
    pub fn new(cameras: &HashMap<String, CameraSettings>, pictures_root: PathBuf) -> Self {
        let mut names: Vec<String> = cameras.keys().cloned().collect();
        names.sort();

        let cameras = names
            .into_iter()
            .map(|name| {
                let settings = &cameras[&name];
                CameraInfo {
                    url: format!("photos/{}", name),
                    image: format!("photos/{}/latest.jpg", name),
                    lat: settings.lat,
                    lon: settings.lon,
                    title: name,
                }
            })
            .collect();

        Self {
            cameras,
            pictures_root,
        }
    }
}
