//! Storage layout tests

use chrono::TimeZone;
use chrono_tz::Tz;

use stillcam::storage::layout::CaptureLayout;

fn stockholm() -> Tz {
    "Europe/Stockholm".parse().unwrap()
}

#[test]
fn paths_are_deterministic() {
    let layout = CaptureLayout::new("/data/photos", stockholm());
    let at = stockholm().with_ymd_and_hms(2026, 6, 1, 12, 30, 5).unwrap();

    let first = layout.capture_file("front", &at);
    let second = layout.capture_file("front", &at);
    assert_eq!(first.path(), second.path());
    assert_eq!(
        first.path().to_str().unwrap(),
        "/data/photos/front/2026-06-01/2026-06-01T12-30-05CEST.jpg"
    );
}

#[test]
fn one_second_apart_differs_only_in_seconds() {
    let layout = CaptureLayout::new("/data/photos", stockholm());
    let at = stockholm().with_ymd_and_hms(2026, 6, 1, 12, 30, 5).unwrap();
    let later = at + chrono::Duration::seconds(1);

    let a = layout.capture_file("front", &at).path().to_path_buf();
    let b = layout.capture_file("front", &later).path().to_path_buf();

    assert_ne!(a, b);
    assert_eq!(a.parent(), b.parent(), "same day-bucket");

    let name_a = a.file_name().unwrap().to_str().unwrap();
    let name_b = b.file_name().unwrap().to_str().unwrap();
    assert_eq!(name_a.replace("12-30-05", ""), name_b.replace("12-30-06", ""));
}

#[test]
fn day_rollover_switches_buckets() {
    let layout = CaptureLayout::new("/data/photos", stockholm());
    let before = stockholm().with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
    let after = stockholm().with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

    assert_eq!(
        layout.day_dir("cam", &before).path().file_name().unwrap(),
        "2026-01-31"
    );
    assert_eq!(
        layout.day_dir("cam", &after).path().file_name().unwrap(),
        "2026-02-01"
    );
}

#[tokio::test]
async fn writes_create_day_buckets_and_latest_link() {
    let root = std::env::temp_dir().join(format!("stillcam-layout-{}", std::process::id()));
    let layout = CaptureLayout::new(&root, "UTC".parse::<Tz>().unwrap());
    let at = Tz::UTC.with_ymd_and_hms(2026, 3, 5, 8, 0, 0).unwrap();

    let file = layout.capture_file("cam", &at);
    file.write_bytes(b"image").await.unwrap();
    assert!(file.exists().await);

    // Writing into an existing bucket is fine.
    file.write_bytes(b"image2").await.unwrap();

    layout.update_latest_link("cam", &file).await.unwrap();
    #[cfg(unix)]
    {
        let latest = root.join("cam").join("latest.jpg");
        let contents = tokio::fs::read(&latest).await.unwrap();
        assert_eq!(contents, b"image2");

        // Repointing is atomic rename, not error.
        layout.update_latest_link("cam", &file).await.unwrap();
    }

    tokio::fs::remove_dir_all(&root).await.unwrap();
}
