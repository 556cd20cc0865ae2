use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = EditorConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert!(cfg.clip_to_frame);
    assert_eq!(cfg.history.undo_throttle_ms, 100);
}

#[test]
fn partial_document_overrides_only_named_fields() {
    let cfg = EditorConfig::from_reader(
        r#"{"clip_to_frame": false, "frame": {"width": 640}, "history": {"settle_ms": 0}}"#
            .as_bytes(),
    )
    .unwrap();
    assert!(!cfg.clip_to_frame);
    assert_eq!(cfg.frame.width, 640.0);
    assert_eq!(cfg.frame.height, 1200.0);
    assert_eq!(cfg.history.settle_ms, 0);
    assert_eq!(cfg.history.undo_throttle_ms, 100);
}

#[test]
fn rejects_bad_frame_and_fit_ratio() {
    assert!(EditorConfig::from_reader(r#"{"frame": {"width": 0}}"#.as_bytes()).is_err());
    assert!(EditorConfig::from_reader(r#"{"viewport": {"fit_ratio": 1.5}}"#.as_bytes()).is_err());
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = EditorConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}
