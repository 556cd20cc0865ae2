use super::*;
use crate::canvas::object::Resource;

fn obj(layer: Layer) -> CanvasObject {
    CanvasObject::new(layer, Resource::None)
}

fn ids(canvas: &Canvas) -> Vec<&str> {
    canvas.objects().iter().map(CanvasObject::id).collect()
}

#[test]
fn backgrounds_are_pinned_to_the_bottom() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::text("a").with_id("t")));
    canvas.add(obj(Layer::new(crate::layer::model::LayerKind::BackgroundImage(
        Default::default(),
    ))
    .with_id("bgi")));
    canvas.add(obj(Layer::background("#fff").with_id("bg")));
    canvas.insert_at(0, obj(Layer::text("b").with_id("t2")));
    assert_eq!(ids(&canvas), vec!["bg", "bgi", "t2", "t"]);
}

#[test]
fn to_layers_puts_frame_first_and_clear_keeps_frame() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::text("a").with_id("t")));
    let layers = canvas.to_layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].layer_type(), LayerType::Frame);

    canvas.clear();
    assert!(canvas.is_empty());
    assert_eq!(canvas.to_layers().len(), 1);
}

#[test]
fn remove_finds_nested_objects_and_drops_selection() {
    let mut canvas = Canvas::default();
    let child = obj(Layer::text("c").with_id("child"));
    canvas.add(CanvasObject::container(
        Layer::group(vec![]).with_id("g"),
        vec![child],
    ));
    canvas.set_active("child").unwrap();
    assert!(canvas.remove("child").is_some());
    assert!(canvas.selection().is_empty());
    assert!(canvas.find("child").is_none());
    assert!(canvas.remove("child").is_none());
}

#[test]
fn hit_test_skips_structural_objects() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::text("a").with_id("t").at(0.0, 0.0).sized(50.0, 50.0)));
    canvas.add(obj(
        Layer::structural(LayerType::Label)
            .with_id("label")
            .at(0.0, 0.0)
            .sized(50.0, 50.0),
    ));
    assert_eq!(canvas.object_at(Point::new(10.0, 10.0)).map(|o| o.id()), Some("t"));
    assert!(canvas.object_at(Point::new(100.0, 100.0)).is_none());
}

#[test]
fn selection_rejects_unknown_ids() {
    let mut canvas = Canvas::default();
    assert!(canvas.set_active("ghost").is_err());
    assert!(!canvas.discard_active());
}

#[test]
fn fit_zoom_uses_the_tighter_axis() {
    let mut canvas = Canvas::default();
    let zoom = canvas.fit_zoom(&ViewportConfig {
        width: 1200.0,
        height: 600.0,
        fit_ratio: 0.5,
    });
    assert!((zoom - 0.25).abs() < 1e-9);
    assert!(canvas.render_requests() > 0);
}

#[test]
fn replace_keeps_the_z_order_slot() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::text("a").with_id("a")));
    canvas.add(obj(Layer::text("b").with_id("b")));
    let old = canvas
        .replace("a", obj(Layer::text("a2").with_id("a")))
        .unwrap();
    assert_eq!(old.layer.base.id.as_deref(), Some("a"));
    assert_eq!(ids(&canvas), vec!["a", "b"]);
    assert!(canvas.replace("zzz", obj(Layer::text("x"))).is_err());
}

fn background_image(id: &str) -> CanvasObject {
    obj(Layer::new(crate::layer::model::LayerKind::BackgroundImage(Default::default())).with_id(id))
}

#[test]
fn background_images_keep_insertion_order() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::background("#fff").with_id("bg")));
    canvas.add(obj(Layer::text("a").with_id("t")));
    canvas.add(background_image("img1"));
    canvas.add(background_image("img2"));
    canvas.insert_at(0, background_image("img3"));
    assert_eq!(ids(&canvas), vec!["bg", "img1", "img2", "img3", "t"]);
}

#[test]
fn second_background_replaces_the_first() {
    let mut canvas = Canvas::default();
    canvas.add(obj(Layer::background("#fff").with_id("bg1")));
    canvas.add(background_image("img"));
    canvas.set_active("bg1").unwrap();
    canvas.add(obj(Layer::background("#000").with_id("bg2")));
    assert_eq!(ids(&canvas), vec!["bg2", "img"]);
    assert!(canvas.selection().is_empty());
}
