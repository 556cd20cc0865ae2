use super::*;
use crate::assets::mock::{MockLoader, png, svg};
use crate::layer::model::{GroupProps, VectorProps};

struct Shift;

impl Placement for Shift {
    fn offset_for(&self, ctx: &ImportContext) -> Option<Vec2> {
        (!ctx.inside_group).then_some(ctx.offset)
    }
}

fn frame_ctx() -> ImportContext {
    ImportContext::frame(
        Vec2::new(10.0, 20.0),
        FrameSize {
            width: 300.0,
            height: 200.0,
        },
    )
}

#[test]
fn base_options_fill_defaults_but_not_stroke() {
    let layer = Layer::text("hi");
    let base = base_options(&layer, Some(Vec2::new(5.0, 6.0)));
    assert!(!base.id.as_deref().unwrap().is_empty());
    assert_eq!(base.name.as_deref(), Some("StaticText"));
    assert_eq!(base.left, Some(5.0));
    assert_eq!(base.top, Some(6.0));
    assert_eq!(base.scale_x, Some(1.0));
    assert_eq!(base.opacity, Some(1.0));
    assert_eq!(base.stroke_width, Some(0.0));
    assert_eq!(base.stroke_line_cap.as_deref(), Some("butt"));
    assert_eq!(base.stroke_line_join.as_deref(), Some("miter"));
    assert_eq!(base.stroke_miter_limit, Some(4.0));
    assert_eq!(base.stroke, None);
}

#[test]
fn base_options_keep_given_values() {
    let mut layer = Layer::text("hi").with_id("keep").with_name("Title");
    layer.base.stroke = Some("#123456".into());
    layer.base.opacity = Some(0.5);
    let base = base_options(&layer, None);
    assert_eq!(base.id.as_deref(), Some("keep"));
    assert_eq!(base.name.as_deref(), Some("Title"));
    assert_eq!(base.stroke.as_deref(), Some("#123456"));
    assert_eq!(base.opacity, Some(0.5));
}

#[tokio::test]
async fn image_size_comes_from_bitmap() {
    let loader = MockLoader::default().with("a.png", png(4, 3, [255, 0, 0, 255]));
    let layer = Layer::image("a.png").with_id("img").at(1.0, 2.0);
    let obj = import_with(&loader, &Shift, &layer, frame_ctx()).await.unwrap();
    assert_eq!((obj.width(), obj.height()), (4.0, 3.0));
    assert_eq!(obj.layer.base.left, Some(11.0));
    assert_eq!(obj.layer.base.top, Some(22.0));
    assert!(matches!(obj.resource, Resource::Image(_)));
}

#[tokio::test]
async fn vector_size_is_inferred_only_when_missing() {
    let loader = MockLoader::default().with("v.svg", svg(40, 30, "#000"));
    let inferred = Layer::vector("v.svg");
    let obj = import_with(&loader, &Shift, &inferred, frame_ctx()).await.unwrap();
    assert_eq!((obj.width(), obj.height()), (40.0, 30.0));

    let explicit = Layer::new(LayerKind::StaticVector(VectorProps {
        src: Some("v.svg".into()),
        color_map: None,
    }))
    .sized(8.0, 6.0);
    let obj = import_with(&loader, &Shift, &explicit, frame_ctx()).await.unwrap();
    assert_eq!((obj.width(), obj.height()), (8.0, 6.0));
}

#[tokio::test]
async fn missing_resource_fails_the_layer() {
    let loader = MockLoader::default();
    let err = import_with(&loader, &Shift, &Layer::image("gone.png"), frame_ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, SceneforgeError::Resource(_)));

    let err = import_with(&loader, &Shift, &Layer::path("", "#000"), frame_ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, SceneforgeError::Import(_)));
}

#[tokio::test]
async fn unknown_type_becomes_placeholder() {
    let loader = MockLoader::default();
    let layer = Layer::from_value(serde_json::json!({"type": "Hologram", "id": "h"})).unwrap();
    let obj = import_with(&loader, &Shift, &layer, frame_ctx()).await.unwrap();
    assert!(obj.is_placeholder());
    assert_eq!(obj.layer.layer_type(), LayerType::Unknown("Hologram".into()));
    assert_eq!((obj.width(), obj.height()), (100.0, 100.0));
}

#[tokio::test]
async fn group_children_keep_local_coordinates() {
    let loader = MockLoader::default();
    let group = Layer::new(LayerKind::Group(GroupProps {
        objects: vec![Layer::text("x").with_id("c").at(3.0, 4.0)],
    }))
    .with_id("g")
    .at(100.0, 100.0);
    let obj = import_with(&loader, &Shift, &group, frame_ctx()).await.unwrap();
    assert_eq!(obj.layer.base.left, Some(110.0));
    assert_eq!(obj.children[0].layer.base.left, Some(3.0));
    assert_eq!(obj.children[0].layer.base.top, Some(4.0));
}

#[tokio::test]
async fn background_takes_frame_size() {
    let loader = MockLoader::default();
    let obj = import_with(&loader, &Shift, &Layer::background("#fff"), frame_ctx())
        .await
        .unwrap();
    assert_eq!((obj.width(), obj.height()), (300.0, 200.0));
}

#[test]
fn text_estimate_scales_with_lines() {
    let props = TextProps {
        text: Some("abcd\nab".into()),
        font_size: Some(10.0),
        line_height: Some(1.0),
        ..TextProps::default()
    };
    assert_eq!(estimate_text_size(&props), (24.0, 20.0));
}
