use std::time::Duration;

use serde_json::json;

use super::*;
use crate::assets::mock::MockLoader;
use crate::canvas::store::Canvas;
use crate::layer::types::LayerType;

fn setup() -> (CanvasHandle, History, ObjectImporter) {
    let canvas = Canvas::default().into_handle();
    let importer = ObjectImporter::new(Arc::new(MockLoader::default()));
    let history = History::new(canvas.clone(), importer.clone(), HistoryConfig::default());
    (canvas, history, importer)
}

async fn add_text(canvas: &CanvasHandle, importer: &ObjectImporter, id: &str) {
    let obj = importer
        .import(&Layer::text(id).with_id(id), ImportContext::absolute())
        .await
        .unwrap();
    canvas.lock().await.add(obj);
}

async fn ids(canvas: &CanvasHandle) -> Vec<String> {
    canvas
        .lock()
        .await
        .objects()
        .iter()
        .map(|o| o.id().to_string())
        .collect()
}

async fn next_window() {
    tokio::time::advance(Duration::from_millis(150)).await;
}

#[tokio::test(start_paused = true)]
async fn save_is_idempotent() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    assert!(history.save().await);
    assert!(!history.save().await);
    assert_eq!(history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn snapshots_exclude_structural_layers() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    let helper = importer
        .import(
            &Layer::structural(LayerType::Label).with_id("lbl"),
            ImportContext::absolute(),
        )
        .await
        .unwrap();
    canvas.lock().await.add(helper);
    history.save().await;
    let status = history.get_status();
    let objects = &status.current().unwrap().objects;
    assert_eq!(objects.len(), 1);
    assert!(objects.iter().all(|l| l.is_renderable()));
}

#[tokio::test(start_paused = true)]
async fn undo_redo_stay_in_bounds() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    history.save().await;

    assert!(!history.undo().await);
    assert_eq!(history.get_status().index, 0);
    next_window().await;
    assert!(!history.redo().await);
    assert_eq!(history.get_status().index, 0);

    assert!(!history.restore(42).await);
}

#[tokio::test(start_paused = true)]
async fn undo_then_redo_rebuilds_the_canvas() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    history.save().await;
    add_text(&canvas, &importer, "b").await;
    history.save().await;

    assert!(history.undo().await);
    assert_eq!(ids(&canvas).await, vec!["a"]);
    let status = history.get_status();
    assert!(!status.has_undo && status.has_redo);

    next_window().await;
    assert!(history.redo().await);
    assert_eq!(ids(&canvas).await, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn rapid_undos_are_coalesced() {
    let (canvas, history, importer) = setup();
    for id in ["a", "b", "c"] {
        add_text(&canvas, &importer, id).await;
        history.save().await;
    }
    next_window().await;
    assert!(history.undo().await);
    assert!(!history.undo().await);
    assert_eq!(history.get_status().index, 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_idempotent_save_then_branch_truncation() {
    let (canvas, history, importer) = setup();
    for id in ["a", "b", "c"] {
        add_text(&canvas, &importer, id).await;
        history.save().await;
    }
    assert_eq!(history.len(), 3);

    history.undo().await;
    next_window().await;
    history.undo().await;
    assert_eq!(history.get_status().index, 0);

    assert!(!history.save().await);
    assert_eq!(history.len(), 3);
    assert_eq!(history.get_status().index, 0);

    add_text(&canvas, &importer, "z").await;
    assert!(history.save().await);
    let status = history.get_status();
    assert_eq!(status.history.len(), 2);
    assert_eq!(status.index, 1);
    let newest: Vec<_> = status.history[1].objects.iter().filter_map(|l| l.id()).collect();
    assert_eq!(newest, vec!["a", "z"]);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_extras_are_per_entry() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    history.save().await;

    let mut extras = Metadata::new();
    extras.insert("sceneId".into(), json!("abc"));
    history.amend(extras);
    let status = history.get_status();
    assert_eq!(status.history[status.index].extras.get("sceneId"), Some(&json!("abc")));
    assert_eq!(status.history.len(), 1);

    add_text(&canvas, &importer, "b").await;
    history.save().await;
    let status = history.get_status();
    assert!(status.history[status.index].extras.get("sceneId").is_none());
}

#[tokio::test(start_paused = true)]
async fn saves_during_restore_are_suppressed() {
    let (canvas, history, importer) = setup();
    add_text(&canvas, &importer, "a").await;
    history.save().await;
    add_text(&canvas, &importer, "b").await;
    history.save().await;
    canvas.lock().await.set_active("b").unwrap();

    let restoring = {
        let history = history.clone();
        tokio::spawn(async move { history.undo().await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(Duration::from_millis(60)).await;
    for _ in 0..100 {
        if history.is_active() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(history.is_active());
    assert!(!history.save().await);

    assert!(restoring.await.unwrap());
    assert!(!history.is_active());
    assert_eq!(history.len(), 2);
    assert!(canvas.lock().await.selection().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_without_affecting_history_suppresses_inner_saves() {
    let (canvas, history, importer) = setup();
    let inner = history.clone();
    let saved = history
        .run_without_affecting_history(|| async move {
            add_text(&canvas, &importer, "a").await;
            inner.save().await
        })
        .await;
    assert!(!saved);
    assert!(history.is_empty());
    assert!(!history.is_active());
}

#[tokio::test(start_paused = true)]
async fn events_follow_save_and_restore() {
    let (canvas, history, importer) = setup();
    let mut rx = history.subscribe();
    add_text(&canvas, &importer, "a").await;
    history.save().await;
    add_text(&canvas, &importer, "b").await;
    history.save().await;
    history.undo().await;

    let mut names = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        names.push(ev.name());
    }
    assert_eq!(
        names,
        vec![
            "history:saved",
            "history:changed",
            "history:saved",
            "history:changed",
            "history:restored",
            "history:changed",
        ]
    );

    history.reset();
    assert!(history.is_empty());
    assert!(!history.get_status().has_undo);
}
