use std::time::Duration;

use serde_json::json;

use super::*;
use crate::assets::mock::{MockLoader, png};
use crate::config::FrameConfig;
use crate::layer::types::LayerType;

fn editor(loader: MockLoader) -> Editor {
    let config = EditorConfig {
        frame: FrameConfig {
            left: 40.0,
            top: 30.0,
            ..FrameConfig::default()
        },
        ..EditorConfig::default()
    };
    Editor::new(config, Arc::new(loader))
}

async fn ids(e: &Editor) -> Vec<String> {
    e.canvas()
        .lock()
        .await
        .objects()
        .iter()
        .map(|o| o.id().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn add_layer_places_relative_to_the_frame_and_records() {
    let e = editor(MockLoader::default());
    let id = e
        .add_layer(&Layer::text("hi").with_id("t").at(1.0, 2.0))
        .await
        .unwrap();
    assert_eq!(id, "t");
    let left = e.canvas().lock().await.find("t").unwrap().layer.base.left;
    assert_eq!(left, Some(41.0));
    assert_eq!(e.history().len(), 1);

    let scene = e.scene().export_to_json().await;
    assert_eq!(scene.layers[0].base.left, Some(1.0));
}

#[tokio::test(start_paused = true)]
async fn structural_layers_cannot_be_added() {
    let e = editor(MockLoader::default());
    assert!(e
        .add_layer(&Layer::structural(LayerType::PositioningHelper))
        .await
        .is_err());
    assert!(e.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn update_merges_attributes_and_reloads_resources() {
    let loader = MockLoader::default()
        .with("a.png", png(2, 2, [255, 0, 0, 255]))
        .with("b.png", png(3, 3, [0, 255, 0, 255]));
    let e = editor(loader);
    e.add_layer(&Layer::image("a.png").with_id("img")).await.unwrap();
    e.update_object("img", &json!({"src": "b.png", "opacity": 0.5}))
        .await
        .unwrap();

    {
        let canvas = e.canvas().lock().await;
        let obj = canvas.find("img").unwrap();
        assert_eq!(obj.layer.base.opacity, Some(0.5));
        match &obj.resource {
            crate::canvas::object::Resource::Image(img) => assert_eq!(img.width, 3),
            other => panic!("unexpected resource {other:?}"),
        }
    }
    assert_eq!(e.history().len(), 2);

    assert!(e.update_object("img", &json!({"type": "StaticText"})).await.is_err());
    assert!(e.update_object("nope", &json!({"opacity": 1.0})).await.is_err());
    assert!(e.update_object("img", &json!([1, 2])).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn failed_update_leaves_the_object_alone() {
    let loader = MockLoader::default().with("a.png", png(2, 2, [255, 0, 0, 255]));
    let e = editor(loader);
    e.add_layer(&Layer::image("a.png").with_id("img")).await.unwrap();
    assert!(e
        .update_object("img", &json!({"src": "missing.png"}))
        .await
        .is_err());
    assert_eq!(ids(&e).await, vec!["img"]);
    assert_eq!(e.history().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn remove_then_undo_restores_the_object() {
    let e = editor(MockLoader::default());
    e.add_layer(&Layer::text("a").with_id("a")).await.unwrap();
    e.add_layer(&Layer::text("b").with_id("b")).await.unwrap();
    e.remove_object("a").await.unwrap();
    assert_eq!(ids(&e).await, vec!["b"]);
    assert!(e.remove_object("a").await.is_err());

    assert!(e.undo().await);
    assert_eq!(ids(&e).await, vec!["a", "b"]);
    tokio::time::advance(Duration::from_millis(150)).await;
    assert!(e.redo().await);
    assert_eq!(ids(&e).await, vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn adding_a_background_replaces_the_current_one() {
    let e = editor(MockLoader::default());
    e.add_layer(&Layer::background("#ffffff").with_id("bg1"))
        .await
        .unwrap();
    e.add_layer(&Layer::text("a").with_id("t")).await.unwrap();
    e.add_layer(&Layer::background("#000000").with_id("bg2"))
        .await
        .unwrap();
    assert_eq!(ids(&e).await, vec!["bg2", "t"]);

    let scene = e.scene().export_to_json().await;
    let backgrounds = scene
        .layers
        .iter()
        .filter(|l| l.layer_type() == LayerType::Background)
        .count();
    assert_eq!(backgrounds, 1);
}
