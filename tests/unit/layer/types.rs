use super::*;

#[test]
fn every_known_tag_is_in_exactly_one_set() {
    let all = [
        "StaticText",
        "StaticImage",
        "BackgroundImage",
        "StaticVideo",
        "StaticAudio",
        "StaticVector",
        "StaticPath",
        "Group",
        "Background",
        "GenerationFrame",
        "Frame",
        "Label",
        "PositioningHelper",
        "GenericNonRenderable",
        "Eraser",
    ];
    for name in all {
        let t = LayerType::from(name);
        assert!(!matches!(t, LayerType::Unknown(_)), "{name} parsed as unknown");
        let in_renderable = RENDERABLE_LAYER_TYPES.contains(&t);
        let in_non = NON_RENDERABLE_LAYER_TYPES.contains(&t);
        assert!(in_renderable ^ in_non, "{name} must be in exactly one set");
        assert_eq!(t.as_str(), name);
    }
}

#[test]
fn unknown_tags_keep_their_name_and_are_renderable() {
    let t = LayerType::from("StaticSparkle");
    assert_eq!(t, LayerType::Unknown("StaticSparkle".to_string()));
    assert_eq!(t.to_string(), "StaticSparkle");
    assert!(!t.is_non_renderable());
}

#[test]
fn structural_helpers_are_non_renderable() {
    assert!(is_non_renderable(&LayerType::Frame));
    assert!(is_non_renderable(&LayerType::Label));
    assert!(is_non_renderable(&LayerType::PositioningHelper));
    assert!(is_non_renderable(&LayerType::GenericNonRenderable));
    assert!(!is_non_renderable(&LayerType::Group));
    assert!(!is_non_renderable(&LayerType::Background));
}

#[test]
fn serde_uses_wire_names() {
    let json = serde_json::to_string(&LayerType::GenerationFrame).unwrap();
    assert_eq!(json, "\"GenerationFrame\"");
    let back: LayerType = serde_json::from_str("\"Frame\"").unwrap();
    assert_eq!(back, LayerType::Frame);
}
