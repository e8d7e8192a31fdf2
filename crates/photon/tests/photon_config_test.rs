use photon::{ConfigStage, ErrorCategory, LogFormat, PhotonConfig, PhotonErrorKind};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_from_file_overrides_and_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photon.toml");
    std::fs::write(
        &path,
        r#"
[store]
root = "/srv/photon"
grant_write = false

[telemetry]
format = "json"
"#,
    )
    .unwrap();

    let config = PhotonConfig::from_file(&path).unwrap();

    assert_eq!(config.store.root(), Some(Path::new("/srv/photon")));
    assert!(!config.store.grant_write());
    assert_eq!(config.store.cache_dir(), ".cache");
    assert_eq!(config.store.copy_buffer_bytes(), 64 * 1024);
    assert_eq!(config.change.moving_photo_video_extension(), "mp4");
    assert_eq!(*config.change.max_display_name_len(), 255);
    assert_eq!(*config.telemetry.format(), LogFormat::Json);
    assert_eq!(config.telemetry.filter(), "info");
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photon.toml");
    std::fs::write(&path, "[store]\ngrant_write = \"sometimes\"\n").unwrap();

    let err = PhotonConfig::from_file(&path).unwrap_err();
    let PhotonErrorKind::Config(config_err) = err.kind() else {
        panic!("expected a configuration error, got {}", err);
    };
    assert_eq!(config_err.path(), Some(path.as_path()));
    assert_eq!(err.category(), ErrorCategory::Store);
}

#[test]
fn test_missing_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");
    let err = PhotonConfig::from_file(&path).unwrap_err();
    let PhotonErrorKind::Config(config_err) = err.kind() else {
        panic!("expected a configuration error, got {}", err);
    };
    assert_eq!(config_err.stage, ConfigStage::Read);
    assert_eq!(config_err.path(), Some(path.as_path()));
    assert!(format!("{}", err).contains("absent.toml"));
}

#[test]
fn test_bundled_defaults_load() {
    let config = PhotonConfig::load().unwrap();
    assert!(!config.store.cache_dir().is_empty());
    assert!(!config.change.moving_photo_video_extension().is_empty());
}
