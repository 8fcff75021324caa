//! Capture source tests

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, GrayImage, Luma};

use stillcam::http::fetch::SnapshotFetcher;
use stillcam::sources::CommandCapture;

fn tiny_png() -> Vec<u8> {
    let image = GrayImage::from_pixel(8, 8, Luma([42]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

#[tokio::test]
async fn command_capture_returns_stdout_image() {
    let png = tiny_png();
    let path = std::env::temp_dir().join(format!("stillcam-cmd-{}.png", std::process::id()));
    tokio::fs::write(&path, &png).await.unwrap();

    let capture = CommandCapture::new(
        &format!("cat {}", path.display()),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(capture.capture("test").await, Some(png));

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn failing_command_is_absence_not_error() {
    let capture = CommandCapture::new("false", Duration::from_secs(5)).unwrap();
    assert_eq!(capture.capture("test").await, None);
}

#[tokio::test]
async fn non_image_output_is_absence() {
    let capture = CommandCapture::new("echo hello", Duration::from_secs(5)).unwrap();
    assert_eq!(capture.capture("test").await, None);
}

#[test]
fn empty_command_is_a_config_error() {
    assert!(CommandCapture::new("   ", Duration::from_secs(5)).is_err());
}

#[tokio::test]
async fn unreachable_snapshot_endpoint_is_absence() {
    let fetcher =
        SnapshotFetcher::new("http://127.0.0.1:9/snap.jpg", Duration::from_secs(1)).unwrap();
    assert_eq!(fetcher.fetch("test").await, None);
}
