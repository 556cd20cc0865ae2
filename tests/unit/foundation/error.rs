use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneforgeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneforgeError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        SceneforgeError::import("x")
            .to_string()
            .contains("import error:")
    );
    assert!(
        SceneforgeError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        SceneforgeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneforgeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = SceneforgeError::from(e);
    assert!(matches!(err, SceneforgeError::Serde(_)));
}
