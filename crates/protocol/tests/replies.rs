use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use dockhand_protocol::*;

const VERSION_1_24_REPLY: &str = r#"{
    "Version": "1.12.6",
    "ApiVersion": "1.24",
    "GitCommit": "78d1802",
    "GoVersion": "go1.6.4",
    "Os": "linux",
    "Arch": "amd64",
    "KernelVersion": "4.9.0-moby",
    "BuildTime": "2017-01-10T20:38:45.000000000+00:00",
    "Experimental": false
}"#;

const MODERN_REPLY: &str = r#"{
    "Platform": {"Name": "Docker Engine - Community"},
    "Version": "24.0.7",
    "ApiVersion": "1.43",
    "MinAPIVersion": "1.12",
    "GitCommit": "311b9ff",
    "GoVersion": "go1.20.10",
    "Os": "linux",
    "Arch": "arm64",
    "KernelVersion": "6.5.0",
    "BuildTime": "Thu Oct 26 09:08:02 2023"
}"#;

#[test]
fn decodes_legacy_version_reply() {
    let info: VersionInfo = serde_json::from_str(VERSION_1_24_REPLY).unwrap();

    assert_eq!(
        info,
        VersionInfo {
            version: "1.12.6".to_string(),
            api_version: ProtocolVersion::V1_24,
            min_api_version: None,
            git_commit: "78d1802".to_string(),
            go_version: "go1.6.4".to_string(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            kernel_version: Some("4.9.0-moby".to_string()),
            build_time: Some(Utc.with_ymd_and_hms(2017, 1, 10, 20, 38, 45).unwrap()),
        }
    );
}

#[test]
fn decodes_modern_reply_with_ctime_build_time() {
    let info: VersionInfo = serde_json::from_str(MODERN_REPLY).unwrap();

    assert_eq!(info.api_version, ProtocolVersion::new(1, 43));
    assert_eq!(info.min_api_version, Some(ProtocolVersion::new(1, 12)));
    assert_eq!(info.build_time, None);
}

#[test]
fn serves_respects_min_and_max() {
    let legacy: VersionInfo = serde_json::from_str(VERSION_1_24_REPLY).unwrap();
    assert!(legacy.serves(ProtocolVersion::V1_17));
    assert!(legacy.serves(DEFAULT_VERSION));
    assert!(!legacy.serves(ProtocolVersion::new(1, 25)));

    let modern: VersionInfo = serde_json::from_str(MODERN_REPLY).unwrap();
    assert!(modern.serves(ProtocolVersion::V1_24));
    assert!(!modern.serves(ProtocolVersion::new(1, 11)));
}

#[test]
fn version_info_reencodes_with_daemon_field_names() {
    let info: VersionInfo = serde_json::from_str(VERSION_1_24_REPLY).unwrap();
    let value = serde_json::to_value(&info).unwrap();

    assert_eq!(value["ApiVersion"], "1.24");
    assert_eq!(value["Os"], "linux");
    assert!(value.get("MinAPIVersion").is_none());
}

#[test]
fn error_reply_decodes_message() {
    let body = r#"{"message":"client is newer than server (client API version: 1.25, server API version: 1.24)"}"#;
    let err = ErrorResponse::from_json(body).unwrap();

    assert!(err.message.contains("client is newer than server"));
    assert!(ErrorResponse::from_json("page not found").is_err());
}

#[test]
fn supported_versions_cover_1_17_through_1_24() {
    let rendered: Vec<String> = SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect();

    assert_eq!(
        rendered,
        vec!["1.17", "1.18", "1.19", "1.20", "1.21", "1.22", "1.23", "1.24"]
    );
}
