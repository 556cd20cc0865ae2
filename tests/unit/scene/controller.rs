use serde_json::json;

use super::*;
use crate::assets::mock::{MockLoader, png};
use crate::canvas::store::Canvas;
use crate::config::{FrameConfig, HistoryConfig};
use crate::foundation::core::FrameSize;
use crate::layer::model::{ImageProps, Layer, LayerKind};

fn controller_with(loader: MockLoader, cfg: EditorConfig) -> (CanvasHandle, History, SceneController) {
    let canvas = Canvas::from_config(&cfg).into_handle();
    let importer = ObjectImporter::new(Arc::new(loader));
    let history = History::new(canvas.clone(), importer.clone(), HistoryConfig::default());
    let ctl = SceneController::new(canvas.clone(), history.clone(), importer, Arc::new(cfg));
    (canvas, history, ctl)
}

fn offset_config() -> EditorConfig {
    EditorConfig {
        frame: FrameConfig {
            left: 100.0,
            top: 50.0,
            ..FrameConfig::default()
        },
        ..EditorConfig::default()
    }
}

fn scene(layers: Vec<Layer>) -> Scene {
    let mut s = Scene::new(FrameSize {
        width: 800.0,
        height: 600.0,
    });
    s.id = "scene-1".to_string();
    s.layers = layers;
    s
}

#[tokio::test(start_paused = true)]
async fn import_offsets_by_frame_and_export_undoes_it() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), offset_config());
    let s = scene(vec![Layer::text("hi").with_id("t").at(10.0, 20.0)]);
    let report = ctl.import_from_json(&s).await.unwrap();
    assert_eq!(report.imported, 1);
    assert!(report.is_complete());

    {
        let c = canvas.lock().await;
        let obj = c.find("t").unwrap();
        assert_eq!(obj.layer.base.left, Some(110.0));
        assert_eq!(obj.layer.base.top, Some(70.0));
        assert!(obj.layer.base.clip_path.is_some());
        assert_eq!(c.frame().size().width, 800.0);
    }

    let out = ctl.export_to_json().await;
    assert_eq!(out.id, "scene-1");
    assert_eq!(out.frame.height, 600.0);
    assert_eq!(out.layers.len(), 1);
    assert_eq!(out.layers[0].base.left, Some(10.0));
    assert_eq!(out.layers[0].base.top, Some(20.0));
    assert!(out.layers[0].base.clip_path.is_none());
    assert_eq!(out.metadata.get(ANIMATED_KEY), Some(&json!(false)));
}

#[tokio::test(start_paused = true)]
async fn export_is_stable_after_a_round_trip() {
    let (_canvas, _history, ctl) = controller_with(MockLoader::default(), offset_config());
    ctl.import_from_json(&scene(vec![
        Layer::background("#ff0000"),
        Layer::text("a").with_id("a").at(5.0, 5.0),
    ]))
    .await
    .unwrap();
    let first = ctl.export_to_json().await;
    ctl.import_from_json(&first).await.unwrap();
    let second = ctl.export_to_json().await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn failing_layers_are_reported_and_skipped() {
    let loader = MockLoader::default().with("ok.png", png(4, 4, [0, 0, 255, 255]));
    let (canvas, _history, ctl) = controller_with(loader, EditorConfig::default());
    let report = ctl
        .import_from_json(&scene(vec![
            Layer::image("ok.png").with_id("ok"),
            Layer::image("missing.png").with_id("bad"),
            Layer::text("t").with_id("t"),
        ]))
        .await
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].id.as_deref(), Some("bad"));
    assert_eq!(canvas.lock().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn import_leaves_one_baseline_history_entry() {
    let (_canvas, history, ctl) = controller_with(MockLoader::default(), EditorConfig::default());
    ctl.import_from_json(&scene(vec![Layer::text("a").with_id("a")]))
        .await
        .unwrap();
    ctl.import_from_json(&scene(vec![Layer::text("b").with_id("b")]))
        .await
        .unwrap();
    let status = history.get_status();
    assert_eq!(status.history.len(), 1);
    assert!(!status.has_undo);
    assert_eq!(
        status.history[0].extras.get(SCENE_ID_EXTRA),
        Some(&json!("scene-1"))
    );
}

#[tokio::test(start_paused = true)]
async fn structural_layers_in_input_are_ignored() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), EditorConfig::default());
    let report = ctl
        .import_from_json(&scene(vec![
            Layer::structural(LayerType::Label).with_id("lbl"),
            Layer::text("a").with_id("a"),
        ]))
        .await
        .unwrap();
    assert_eq!(report.imported, 1);
    assert!(canvas.lock().await.find("lbl").is_none());
}

#[tokio::test(start_paused = true)]
async fn background_gets_configured_shadow() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), EditorConfig::default());
    ctl.import_from_json(&scene(vec![Layer::background("#00ff00").with_id("bg")]))
        .await
        .unwrap();
    let c = canvas.lock().await;
    let bg = c.find("bg").unwrap();
    assert_eq!(
        bg.layer.base.shadow.as_ref().map(|s| s.color.as_str()),
        Some("#afafaf")
    );
    assert_eq!(bg.layer.base.width, Some(800.0));
}

#[tokio::test(start_paused = true)]
async fn invalid_frame_is_rejected_before_touching_the_canvas() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), EditorConfig::default());
    ctl.import_from_json(&scene(vec![Layer::text("a").with_id("a")]))
        .await
        .unwrap();
    let mut bad = scene(vec![]);
    bad.frame.width = 0.0;
    assert!(ctl.import_from_json(&bad).await.is_err());
    assert_eq!(canvas.lock().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn component_comes_from_the_selection() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), offset_config());
    ctl.import_from_json(&scene(vec![Layer::text("a").with_id("a").at(1.0, 2.0)]))
        .await
        .unwrap();
    assert!(ctl.export_as_component().await.is_none());
    canvas.lock().await.set_active("a").unwrap();
    let component = ctl.export_as_component().await.unwrap();
    assert_eq!(component.layer.base.left, Some(1.0));
    assert!(component.layer.base.clip_path.is_none());
}

fn background_image(src: &str, id: &str) -> Layer {
    Layer::new(LayerKind::BackgroundImage(ImageProps {
        src: Some(src.to_string()),
        ..ImageProps::default()
    }))
    .with_id(id)
}

async fn top_level_ids(canvas: &CanvasHandle) -> Vec<String> {
    canvas
        .lock()
        .await
        .objects()
        .iter()
        .map(|o| o.id().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn background_images_keep_declared_order_across_round_trips() {
    let loader = MockLoader::default()
        .with("one.png", png(4, 4, [255, 0, 0, 255]))
        .with("two.png", png(4, 4, [0, 255, 0, 255]));
    let (canvas, _history, ctl) = controller_with(loader, offset_config());
    ctl.import_from_json(&scene(vec![
        Layer::background("#ffffff").with_id("bg"),
        background_image("one.png", "img1"),
        background_image("two.png", "img2"),
        Layer::text("t").with_id("t"),
    ]))
    .await
    .unwrap();
    assert_eq!(top_level_ids(&canvas).await, vec!["bg", "img1", "img2", "t"]);

    let first = ctl.export_to_json().await;
    let order: Vec<_> = first.layers.iter().filter_map(Layer::id).collect();
    assert_eq!(order, vec!["bg", "img1", "img2", "t"]);

    ctl.import_from_json(&first).await.unwrap();
    let second = ctl.export_to_json().await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn undo_redo_keep_background_image_order() {
    let loader = MockLoader::default()
        .with("one.png", png(4, 4, [255, 0, 0, 255]))
        .with("two.png", png(4, 4, [0, 255, 0, 255]));
    let (canvas, history, ctl) = controller_with(loader, EditorConfig::default());
    ctl.import_from_json(&scene(vec![
        Layer::background("#ffffff").with_id("bg"),
        background_image("one.png", "img1"),
        background_image("two.png", "img2"),
    ]))
    .await
    .unwrap();

    canvas.lock().await.remove("img1");
    assert!(history.save().await);
    assert_eq!(top_level_ids(&canvas).await, vec!["bg", "img2"]);

    assert!(history.undo().await);
    assert_eq!(top_level_ids(&canvas).await, vec!["bg", "img1", "img2"]);

    tokio::time::advance(std::time::Duration::from_millis(150)).await;
    assert!(history.redo().await);
    assert_eq!(top_level_ids(&canvas).await, vec!["bg", "img2"]);

    tokio::time::advance(std::time::Duration::from_millis(150)).await;
    assert!(history.undo().await);
    assert_eq!(top_level_ids(&canvas).await, vec!["bg", "img1", "img2"]);
}

#[tokio::test(start_paused = true)]
async fn own_clip_path_survives_import_and_export() {
    let (canvas, _history, ctl) = controller_with(MockLoader::default(), offset_config());
    let mut text = Layer::text("masked").with_id("t").at(10.0, 10.0);
    text.base.clip_path = Some(Box::new(
        Layer::path("M0 0 L10 0 L10 10 Z", "#000000").with_id("c"),
    ));
    let plain = Layer::text("plain").with_id("p");
    ctl.import_from_json(&scene(vec![text, plain])).await.unwrap();

    {
        let c = canvas.lock().await;
        let own = c.find("t").unwrap().layer.base.clip_path.as_deref().unwrap();
        assert_eq!(own.id(), Some("c"));
        let framed = c.find("p").unwrap().layer.base.clip_path.as_deref().unwrap();
        assert_eq!(framed.id(), Some("frame-clip"));
    }

    let first = ctl.export_to_json().await;
    let clip = first.layers[0].base.clip_path.as_deref().unwrap();
    assert_eq!(clip.id(), Some("c"));
    assert!(first.layers[1].base.clip_path.is_none());

    ctl.import_from_json(&first).await.unwrap();
    assert_eq!(ctl.export_to_json().await, first);
}
