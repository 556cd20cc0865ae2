use serde_json::json;

use super::*;

fn scene_json() -> serde_json::Value {
    json!({
        "id": "s1",
        "name": "Poster",
        "frame": {"width": 200.0, "height": 100.0},
        "layers": [
            {"type": "Background", "id": "bg", "fill": "#ffffff"},
            {"type": "Group", "id": "g", "objects": [
                {"type": "StaticText", "id": "t", "text": "hi"}
            ]}
        ],
        "metadata": {"animated": false}
    })
}

#[test]
fn parses_and_writes_back() {
    let scene = Scene::from_reader(scene_json().to_string().as_bytes()).unwrap();
    assert_eq!(scene.layers.len(), 2);
    assert!(!scene.is_animated());
    assert!(scene.find_layer("t").is_some());
    scene.validate().unwrap();

    let mut buf = Vec::new();
    scene.to_writer(&mut buf).unwrap();
    let back = Scene::from_reader(buf.as_slice()).unwrap();
    assert_eq!(back, scene);
}

#[test]
fn missing_frame_is_a_serde_error() {
    let err = Scene::from_reader(r#"{"layers": []}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, SceneforgeError::Serde(_)));
}

#[test]
fn duplicate_ids_are_rejected_even_when_nested() {
    let mut v = scene_json();
    v["layers"][1]["objects"][0]["id"] = json!("bg");
    let scene: Scene = serde_json::from_value(v).unwrap();
    let err = scene.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate layer id 'bg'"));
}

#[test]
fn non_positive_sizes_and_structural_layers_are_rejected() {
    let mut v = scene_json();
    v["layers"][0]["width"] = json!(0.0);
    let scene: Scene = serde_json::from_value(v).unwrap();
    assert!(scene.validate().is_err());

    let mut v = scene_json();
    v["layers"].as_array_mut().unwrap().push(json!({"type": "Frame"}));
    let scene: Scene = serde_json::from_value(v).unwrap();
    assert!(scene.validate().is_err());

    let mut scene: Scene = serde_json::from_value(scene_json()).unwrap();
    scene.frame.width = 0.0;
    assert!(scene.validate().is_err());
}

#[test]
fn animation_follows_video_layers() {
    let video = Layer::from_value(json!({"type": "StaticVideo", "src": "a.mp4"})).unwrap();
    assert!(contains_animation(&[Layer::group(vec![video])]));
    assert!(!contains_animation(&[Layer::text("x")]));
}
