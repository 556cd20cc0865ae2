use super::*;
use serde_json::json;

#[test]
fn flat_json_parses_into_base_and_kind() {
    let v = json!({
        "id": "t1",
        "type": "StaticText",
        "left": 50.0,
        "top": 60.0,
        "text": "hello",
        "fontSize": 24.0,
        "fontURL": "fonts/a.ttf",
        "fill": "#ff0000"
    });
    let layer = Layer::from_value(v).unwrap();
    assert_eq!(layer.id(), Some("t1"));
    assert_eq!(layer.base.left, Some(50.0));
    assert_eq!(layer.layer_type(), LayerType::StaticText);
    let LayerKind::StaticText(p) = &layer.kind else {
        panic!("expected text kind");
    };
    assert_eq!(p.text.as_deref(), Some("hello"));
    assert_eq!(p.font_size, Some(24.0));
    assert_eq!(p.font_url.as_deref(), Some("fonts/a.ttf"));
}

#[test]
fn serialization_is_flat_and_tagged() {
    let layer = Layer::text("hi").with_id("a").at(1.0, 2.0);
    let v = layer.to_value().unwrap();
    assert_eq!(v["type"], "StaticText");
    assert_eq!(v["text"], "hi");
    assert_eq!(v["left"], 1.0);
    assert!(v.get("stroke").is_none());
    assert!(v.get("base").is_none());
}

#[test]
fn nested_children_survive_serde() {
    let group = Layer::group(vec![
        Layer::image("a.png").with_id("c1"),
        Layer::path("M0 0 L10 10", "#000000").with_id("c2"),
    ])
    .with_id("g");
    let text = serde_json::to_string(&group).unwrap();
    let back: Layer = serde_json::from_str(&text).unwrap();
    assert_eq!(back, group);
    assert_eq!(back.children().unwrap().len(), 2);
}

#[test]
fn unknown_type_keeps_its_attributes() {
    let v = json!({"type": "Sparkle", "id": "s", "left": 3.0, "twinkle": 7});
    let layer = Layer::from_value(v).unwrap();
    match &layer.kind {
        LayerKind::Unknown { type_name, props } => {
            assert_eq!(type_name, "Sparkle");
            assert_eq!(props.get("twinkle"), Some(&json!(7)));
            assert!(props.get("left").is_none());
        }
        other => panic!("unexpected kind {other:?}"),
    }
    let out = layer.to_value().unwrap();
    assert_eq!(out["type"], "Sparkle");
    assert_eq!(out["twinkle"], 7);
    assert_eq!(out["left"], 3.0);
}

#[test]
fn missing_type_is_unknown() {
    let layer = Layer::from_value(json!({"id": "x"})).unwrap();
    assert_eq!(layer.layer_type(), LayerType::Unknown(String::new()));
}

#[test]
fn non_object_is_rejected() {
    assert!(Layer::from_value(json!([1, 2])).is_err());
}

#[test]
fn clip_path_and_shadow_round_trip() {
    let mut layer = Layer::background("#ffffff").with_id("bg");
    layer.base.shadow = Some(Shadow {
        blur: 2.0,
        color: "#000000".to_string(),
        offset_x: 1.0,
        offset_y: 3.0,
        affect_stroke: true,
    });
    layer.base.clip_path = Some(Box::new(Layer::path("M0 0 L1 1", "#000000")));
    let v = layer.to_value().unwrap();
    assert_eq!(v["shadow"]["offsetY"], 3.0);
    assert_eq!(v["shadow"]["affectStroke"], true);
    assert_eq!(v["clipPath"]["type"], "StaticPath");
    assert_eq!(Layer::from_value(v).unwrap(), layer);
}

#[test]
fn walk_visits_nested_layers() {
    let layer = Layer::generation_frame(vec![
        Layer::group(vec![Layer::text("a").with_id("deep")]).with_id("mid"),
    ])
    .with_id("top");
    let mut seen = Vec::new();
    layer.walk(&mut |l| seen.push(l.id().unwrap_or_default().to_string()));
    assert_eq!(seen, vec!["top", "mid", "deep"]);
}

#[test]
fn base_accessors_apply_defaults() {
    let base = LayerBase::default();
    assert_eq!(base.scale_x(), 1.0);
    assert_eq!(base.opacity(), 1.0);
    assert_eq!(base.stroke_width(), 0.0);
    assert_eq!(base.left(), 0.0);
}
