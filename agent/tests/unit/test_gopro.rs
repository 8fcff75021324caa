//! Capture protocol tests against an in-process mock camera

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use stillcam::errors::CamError;
use stillcam::filesys::file::File;
use stillcam::gopro::{GoProCamera, GoProOptions};

type CallLog = Arc<Mutex<Vec<String>>>;

async fn start_mock_camera() -> (SocketAddr, CallLog) {
    let calls: CallLog = Arc::default();

    let app = Router::new()
        .route("/api/v1/camera/setting", post(setting))
        .route("/api/v1/camera/preset", post(preset))
        .route("/api/v1/command/shutter", post(shutter))
        .route("/api/v1/media/list", get(media_list))
        .route("/api/v1/media/{dir}/{file}", get(download))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, calls)
}

async fn setting(State(calls): State<CallLog>, Json(body): Json<Value>) -> &'static str {
    assert_eq!(body, json!({ "setting_id": 175, "value": 1 }));
    calls.lock().unwrap().push("setting".to_string());
    ""
}

async fn preset(State(calls): State<CallLog>, Json(body): Json<Value>) -> &'static str {
    assert_eq!(body, json!({ "preset_id": 65539 }));
    calls.lock().unwrap().push("preset".to_string());
    ""
}

async fn shutter(State(calls): State<CallLog>) -> &'static str {
    calls.lock().unwrap().push("shutter".to_string());
    ""
}

async fn media_list(State(calls): State<CallLog>) -> Json<Value> {
    calls.lock().unwrap().push("list".to_string());
    // Legacy field names, plus the metadata the driver must ignore.
    Json(json!({
        "id": "1554375628411872255",
        "media": [
            { "d": "100GOPRO",
              "fs": [ { "cre": 1696600109, "mod": 1696600109, "n": "GOPR0001.JPG", "s": 2806303 } ] }
        ]
    }))
}

async fn download(
    State(calls): State<CallLog>,
    Path((dir, file)): Path<(String, String)>,
) -> Vec<u8> {
    calls.lock().unwrap().push(format!("download {}/{}", dir, file));
    b"jpeg-bytes".to_vec()
}

fn camera_for(addr: SocketAddr) -> GoProCamera {
    GoProCamera::new(
        GoProOptions {
            ip_address: addr.to_string(),
            timeout: Duration::from_secs(2),
            reachability_timeout: Duration::from_secs(5),
            ..Default::default()
        },
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn protocol_runs_the_stages_in_order() {
    let (addr, calls) = start_mock_camera().await;

    let bytes = camera_for(addr).capture_photo(None).await.unwrap();
    assert_eq!(bytes, b"jpeg-bytes");

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "setting",
            "preset",
            "shutter",
            "list",
            "download 100GOPRO/GOPR0001.JPG",
        ]
    );
}

#[tokio::test]
async fn unreachable_camera_fails_without_issuing_requests() {
    // Nothing listens on the discard port.
    let camera = GoProCamera::new(
        GoProOptions {
            ip_address: "127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
            reachability_timeout: Duration::from_secs(1),
            ..Default::default()
        },
        None,
    )
    .unwrap();

    match camera.capture_photo(None).await {
        Err(CamError::DeviceUnreachable { address, .. }) => {
            assert_eq!(address, "127.0.0.1:9");
        }
        other => panic!("expected DeviceUnreachable, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn capture_writes_the_output_file() {
    let (addr, _calls) = start_mock_camera().await;

    let path = std::env::temp_dir().join(format!("stillcam-gopro-{}.jpg", std::process::id()));
    let output = File::new(&path);

    camera_for(addr).capture_photo(Some(&output)).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"jpeg-bytes");

    tokio::fs::remove_file(&path).await.unwrap();
}
