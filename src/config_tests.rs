use super::*;

#[test]
fn default_config_is_valid() {
    let config = default_config();
    validate_config(&config).expect("default config validates");
    assert_eq!(config.export_dir(), PathBuf::from("files").join("sip"));
}

#[test]
fn stub_parses_back_to_defaults() {
    let stub = render_config(&default_config()).expect("stub");
    let parsed: ExportConfig = serde_json::from_str(&stub).expect("parse stub");
    assert_eq!(parsed, default_config());
}

#[test]
fn missing_optional_fields_take_defaults() {
    let parsed: ExportConfig =
        serde_json::from_str(r#"{"schema_version": 1, "files_dir": "/srv/files"}"#)
            .expect("parse minimal config");
    assert_eq!(parsed.exportable_status, 3);
    assert_eq!(parsed.genres, GenreMap::default());
    assert_eq!(parsed.package.submission_reason, "LZV Bayern");
    assert_eq!(parsed.export_dir(), PathBuf::from("/srv/files/sip"));
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = default_config();
    config.schema_version = 9;
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.genres.revised_manuscript = config.genres.reviewed_manuscript;
    let err = validate_config(&config).expect_err("same genres rejected");
    assert!(err.to_string().contains("must differ"));

    let mut config = default_config();
    config.package.ie_entity_type = "  ".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn write_config_refuses_overwrite_without_force() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.json");
    write_config(&path, &default_config(), false).expect("first write");
    assert!(write_config(&path, &default_config(), false).is_err());
    write_config(&path, &default_config(), true).expect("forced write");
    assert_eq!(load_config(&path).expect("load"), default_config());
}

#[test]
fn genre_map_assigns_review_roles() {
    let genres = GenreMap::default();
    assert_eq!(genres.genre_for(ReviewRole::Reviewed), 13);
    assert_eq!(genres.genre_for(ReviewRole::Revised), 15);
    assert_eq!(ReviewRole::Revised.node_name(), "revised_manuscript");
}
