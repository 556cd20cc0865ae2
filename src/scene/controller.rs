//! Scene-level import and export against the live canvas.
//!
//! Import replaces the canvas contents wholesale with history suppressed, then resets the log and
//! records the loaded scene as its single baseline entry. Export projects the canvas back to
//! frame-relative plain data.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::canvas::store::CanvasHandle;
use crate::config::EditorConfig;
use crate::export::exporter::export_layers;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::foundation::ids;
use crate::history::engine::History;
use crate::import::base::ImportContext;
use crate::import::importer::ObjectImporter;
use crate::layer::model::Metadata;
use crate::layer::types::LayerType;
use crate::scene::component::{Component, build_component};
use crate::scene::model::{ANIMATED_KEY, Scene, contains_animation};

/// Extras key naming the scene a baseline history entry belongs to.
pub const SCENE_ID_EXTRA: &str = "sceneId";

/// A layer that could not be placed on the canvas during a scene import.
#[derive(Debug)]
pub struct LayerFailure {
    /// Position in [`Scene::layers`].
    pub index: usize,
    /// Layer id, if it had one.
    pub id: Option<String>,
    /// Declared type.
    pub layer_type: LayerType,
    /// Why the import failed.
    pub error: SceneforgeError,
}

/// Outcome of [`SceneController::import_from_json`].
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Objects now on the canvas, frame clip excluded.
    pub imported: usize,
    /// Layers that failed, in scene order.
    pub failed: Vec<LayerFailure>,
}

impl ImportReport {
    /// Whether every renderable layer was imported.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
struct Identity {
    id: Option<String>,
    name: String,
    metadata: Metadata,
}

/// Scene-level import and export on one canvas.
pub struct SceneController {
    canvas: CanvasHandle,
    history: History,
    importer: ObjectImporter,
    config: Arc<EditorConfig>,
    identity: Mutex<Identity>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SceneController {
    /// Controller over `canvas`, committing to `history`.
    pub fn new(
        canvas: CanvasHandle,
        history: History,
        importer: ObjectImporter,
        config: Arc<EditorConfig>,
    ) -> Self {
        Self {
            canvas,
            history,
            importer,
            config,
            identity: Mutex::new(Identity::default()),
        }
    }

    /// Id of the loaded scene, if any was loaded or exported.
    pub fn scene_id(&self) -> Option<String> {
        lock(&self.identity).id.clone()
    }

    /// Serialize the canvas as a frame-relative scene.
    ///
    /// Structural layers and the frame clip are left out; `metadata.animated` is recomputed.
    #[instrument(level = "debug", skip(self))]
    pub async fn export_to_json(&self) -> Scene {
        let (layers, frame) = {
            let canvas = self.canvas.lock().await;
            let frame = canvas.frame();
            (
                export_layers(&canvas.to_layers(), frame.offset()),
                frame.size(),
            )
        };

        let mut identity = lock(&self.identity);
        let id = identity.id.get_or_insert_with(ids::new_id).clone();
        let mut metadata = identity.metadata.clone();
        metadata.insert(
            ANIMATED_KEY.to_string(),
            Value::Bool(contains_animation(&layers)),
        );

        Scene {
            id,
            name: identity.name.clone(),
            frame,
            layers,
            metadata,
        }
    }

    /// Export the current selection as a reusable component.
    pub async fn export_as_component(&self) -> Option<Component> {
        let canvas = self.canvas.lock().await;
        let offset = canvas.frame().offset();
        build_component(&canvas.selected_objects(), offset)
    }

    /// Replace the canvas with `scene`.
    ///
    /// Layers whose resources fail are logged, reported and skipped; the rest still load. On
    /// return history holds exactly one entry: the loaded scene.
    #[instrument(skip(self, scene), fields(scene = %scene.id, layers = scene.layers.len()))]
    pub async fn import_from_json(&self, scene: &Scene) -> SceneforgeResult<ImportReport> {
        scene.frame.validate()?;

        let report = self
            .history
            .run_without_affecting_history(|| self.load(scene))
            .await;

        {
            let mut identity = lock(&self.identity);
            identity.id = Some(ids::id_or_new(Some(&scene.id)));
            identity.name = scene.name.clone();
            identity.metadata = scene.metadata.clone();
            identity.metadata.remove(ANIMATED_KEY);
        }

        self.history.reset();
        self.history.save().await;
        if let Some(id) = self.scene_id() {
            let mut extras = Metadata::new();
            extras.insert(SCENE_ID_EXTRA.to_string(), Value::String(id));
            self.history.amend(extras);
        }

        info!(
            imported = report.imported,
            failed = report.failed.len(),
            "scene loaded"
        );
        Ok(report)
    }

    async fn load(&self, scene: &Scene) -> ImportReport {
        let mut canvas = self.canvas.lock().await;
        canvas.clear();
        canvas.frame_mut().resize(scene.frame);
        let ctx = ImportContext::frame(canvas.frame().offset(), scene.frame);
        let clip = self
            .config
            .clip_to_frame
            .then(|| Box::new(canvas.frame().clip_layer()));

        let mut report = ImportReport::default();
        for (index, layer) in scene.layers.iter().enumerate() {
            if !layer.is_renderable() {
                debug!(index, kind = %layer.layer_type(), "structural layer ignored");
                continue;
            }
            match self.importer.import(layer, ctx).await {
                Ok(mut obj) => {
                    if obj.layer_type() == LayerType::Background
                        && let Some(shadow) = &self.config.background_shadow
                    {
                        obj.layer.base.shadow = Some(shadow.clone());
                    }
                    if let Some(clip) = &clip
                        && obj.layer.base.clip_path.is_none()
                    {
                        obj.layer.base.clip_path = Some(clip.clone());
                    }
                    canvas.add(obj);
                    report.imported += 1;
                }
                Err(error) => {
                    warn!(index, id = ?layer.id(), kind = %layer.layer_type(), error = %error, "layer skipped");
                    report.failed.push(LayerFailure {
                        index,
                        id: layer.id().map(str::to_string),
                        layer_type: layer.layer_type(),
                        error,
                    });
                }
            }
        }

        canvas.fit_zoom(&self.config.viewport);
        canvas.discard_active();
        report
    }
}

impl std::fmt::Debug for SceneController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneController")
            .field("scene", &lock(&self.identity).id)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/controller.rs"]
mod tests;
