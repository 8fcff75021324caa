//! Settings parsing tests

use stillcam::app::options::AppOptions;
use stillcam::settings::Settings;
use stillcam::similarity::CompareArea;

#[test]
fn full_config_parses() {
    let json = r#"{
        "log_level": "debug",
        "server": { "enabled": true, "host": "0.0.0.0", "port": 9000 },
        "cameras": {
            "front": { "url": "http://cam.local/snap.jpg",
                       "compare_area": [100, 0, 400, 50],
                       "lat": 59.3, "lon": 18.1 },
            "yard":  { "command": "libcamera-still --nopreview -o -", "interval_s": 60 },
            "roof":  { "gopro": { "ip_address": "10.5.5.9", "ble_address": "AA:BB:CC:DD:EE:FF" } }
        },
        "global": { "timezone": "Europe/Stockholm", "pictures_dir": "/tmp/photos" }
    }"#;

    let settings: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.server.port, 9000);

    let front = &settings.cameras["front"];
    assert_eq!(front.timeout_s, 20, "default timeout");
    assert_eq!(
        front.compare_area.unwrap(),
        CompareArea {
            x: 100,
            y: 0,
            width: 400,
            height: 50
        }
    );

    assert_eq!(settings.cameras["yard"].interval_s, Some(60));

    let roof = settings.cameras["roof"].gopro.as_ref().unwrap();
    assert_eq!(roof.ip_address, "10.5.5.9");
    assert_eq!(roof.reachability_timeout_s, 30, "default reachability");

    let options = AppOptions::from_settings(&settings).unwrap();
    assert_eq!(options.timezone.name(), "Europe/Stockholm");
    assert_eq!(options.server.host, "0.0.0.0");
}

#[test]
fn minimal_config_gets_defaults() {
    let settings: Settings =
        serde_json::from_str(r#"{ "cameras": { "c": { "url": "http://x/y" } } }"#).unwrap();
    assert!(settings.server.enabled);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.global.timezone, "UTC");
}

#[test]
fn unknown_timezone_is_rejected() {
    let settings: Settings =
        serde_json::from_str(r#"{ "global": { "timezone": "Mars/Olympus" } }"#).unwrap();
    assert!(AppOptions::from_settings(&settings).is_err());
}
