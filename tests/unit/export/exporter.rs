use serde_json::json;

use super::*;
use crate::canvas::frame::FrameController;
use crate::config::FrameConfig;
use crate::layer::types::LayerType;

#[test]
fn coordinates_become_frame_relative() {
    let layer = Layer::text("a").with_id("t").at(150.0, 70.0);
    let out = export_layer(&layer, Vec2::new(100.0, 20.0));
    assert_eq!(out.base.left, Some(50.0));
    assert_eq!(out.base.top, Some(50.0));
}

#[test]
fn children_stay_local_and_helpers_are_dropped() {
    let group = Layer::group(vec![
        Layer::text("a").with_id("a").at(5.0, 5.0),
        Layer::structural(LayerType::Label).with_id("lbl"),
    ])
    .with_id("g")
    .at(110.0, 110.0);
    let out = export_layer(&group, Vec2::new(100.0, 100.0));
    let kids = out.children().unwrap();
    assert_eq!(kids.len(), 1);
    assert_eq!(kids[0].base.left, Some(5.0));
}

#[test]
fn frame_clip_is_dropped_but_own_clip_kept() {
    let frame = FrameController::from_config(&FrameConfig::default());
    let mut clipped = Layer::text("a");
    clipped.base.clip_path = Some(Box::new(frame.clip_layer()));
    assert!(export_layer(&clipped, Vec2::ZERO).base.clip_path.is_none());

    let mut own = Layer::text("b");
    own.base.clip_path = Some(Box::new(Layer::path("M0 0 L1 1", "#000")));
    assert!(export_layer(&own, Vec2::ZERO).base.clip_path.is_some());
}

#[test]
fn structural_layers_never_leave_the_canvas() {
    let frame = FrameController::from_config(&FrameConfig::default());
    let layers = vec![
        frame.to_layer(),
        Layer::text("a").with_id("t"),
        Layer::structural(LayerType::GenericNonRenderable),
    ];
    let out = export_layers(&layers, frame.offset());
    assert_eq!(out.len(), 1);
    assert!(out.iter().all(|l| l.is_renderable()));
}

#[test]
fn transient_generation_state_is_not_exported() {
    let layer = Layer::generation_frame(vec![])
        .with_meta("prompt", json!("cat"))
        .with_meta("error", json!("boom"));
    let out = export_layer(&layer, Vec2::ZERO);
    let meta = out.base.metadata.unwrap();
    assert_eq!(meta.get("prompt"), Some(&json!("cat")));
    assert!(meta.get("error").is_none());
}
