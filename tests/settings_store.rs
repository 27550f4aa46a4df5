use photo_markup::settings::{MarkupSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;

#[test]
fn settings_roundtrip_through_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

    let settings = MarkupSettings {
        debug_logging: true,
        log_file: Some(PathBuf::from("markup.log")),
        export_dir: Some(dir.path().join("exports")),
        export_prefix: "annotated".to_string(),
        viewport: (720, 1280),
    };
    settings.save(&path).expect("save settings");

    let loaded = MarkupSettings::load(&path).expect("load settings");
    assert_eq!(loaded, settings);
}

#[test]
fn empty_file_loads_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(SETTINGS_FILE_NAME);
    std::fs::write(&path, "   \n").expect("write");
    assert_eq!(
        MarkupSettings::load(&path).expect("load"),
        MarkupSettings::default()
    );
}

#[test]
fn malformed_file_is_an_error_with_path_context() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(SETTINGS_FILE_NAME);
    std::fs::write(&path, "{ not json").expect("write");
    let err = MarkupSettings::load(&path).expect_err("malformed");
    assert!(format!("{err:#}").contains(SETTINGS_FILE_NAME));
}
