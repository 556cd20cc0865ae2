//! One editing session: canvas, history, scene I/O and rendering wired together.
//!
//! Editing operations go through the editor so that each one records a history entry.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::assets::loader::{FsResourceLoader, SharedLoader};
use crate::canvas::store::{Canvas, CanvasHandle};
use crate::config::EditorConfig;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::history::engine::History;
use crate::import::base::ImportContext;
use crate::import::importer::ObjectImporter;
use crate::layer::model::Layer;
use crate::render::renderer::Renderer;
use crate::scene::controller::SceneController;

/// One editing session: a canvas with its history, scene I/O and renderer.
pub struct Editor {
    config: Arc<EditorConfig>,
    canvas: CanvasHandle,
    importer: ObjectImporter,
    history: History,
    scene: SceneController,
    renderer: Renderer,
}

impl Editor {
    /// Editor on `loader`, with the canvas sized from `config.frame`.
    pub fn new(config: EditorConfig, loader: SharedLoader) -> Self {
        let config = Arc::new(config);
        let canvas = Canvas::from_config(&config).into_handle();
        let importer = ObjectImporter::new(loader.clone());
        let history = History::new(canvas.clone(), importer.clone(), config.history.clone());
        let scene = SceneController::new(
            canvas.clone(),
            history.clone(),
            importer.clone(),
            config.clone(),
        );
        Self {
            renderer: Renderer::new(loader),
            config,
            canvas,
            importer,
            history,
            scene,
        }
    }

    /// Editor resolving relative resources against `config.assets_root`.
    pub fn with_fs_loader(config: EditorConfig) -> SceneforgeResult<Self> {
        config.validate()?;
        let loader = FsResourceLoader::new(config.assets_root.clone());
        Ok(Self::new(config, Arc::new(loader)))
    }

    /// Configuration the editor was built with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Shared live canvas.
    pub fn canvas(&self) -> &CanvasHandle {
        &self.canvas
    }

    /// Undo log of the canvas.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Scene import and export.
    pub fn scene(&self) -> &SceneController {
        &self.scene
    }

    /// Headless renderer sharing the editor's loader.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Import a frame-relative layer on top of the canvas and record it. Returns the object id.
    ///
    /// A `Background` replaces the current one instead of stacking.
    #[instrument(skip_all, fields(kind = %layer.layer_type()))]
    pub async fn add_layer(&self, layer: &Layer) -> SceneforgeResult<String> {
        if !layer.is_renderable() {
            return Err(SceneforgeError::validation(format!(
                "structural layer type '{}' cannot be added",
                layer.layer_type()
            )));
        }
        let id = {
            let mut canvas = self.canvas.lock().await;
            let frame = canvas.frame();
            let ctx = ImportContext::frame(frame.offset(), frame.size());
            let obj = self.importer.import(layer, ctx).await?;
            let id = obj.id().to_string();
            canvas.add(obj);
            id
        };
        self.history.save().await;
        Ok(id)
    }

    /// Merge `patch` (layer attributes, camelCase) into object `id`, reload its resources and
    /// record the change. Coordinates in the patch are canvas space.
    #[instrument(skip(self, patch))]
    pub async fn update_object(&self, id: &str, patch: &Value) -> SceneforgeResult<()> {
        let Value::Object(fields) = patch else {
            return Err(SceneforgeError::validation("update patch must be a JSON object"));
        };
        if fields.contains_key("type") || fields.contains_key("id") {
            return Err(SceneforgeError::validation(
                "update patch must not change 'type' or 'id'",
            ));
        }
        {
            let mut canvas = self.canvas.lock().await;
            let current = canvas
                .find(id)
                .ok_or_else(|| SceneforgeError::validation(format!("unknown object '{id}'")))?
                .to_layer();
            let mut value = current.to_value()?;
            if let Value::Object(target) = &mut value {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            let updated = Layer::from_value(value)?;
            let obj = self
                .importer
                .import(&updated, ImportContext::absolute())
                .await?;
            canvas.replace(id, obj)?;
        }
        debug!(id, "object updated");
        self.history.save().await;
        Ok(())
    }

    /// Remove object `id` (top-level or nested) and record it.
    #[instrument(skip(self))]
    pub async fn remove_object(&self, id: &str) -> SceneforgeResult<()> {
        let removed = self.canvas.lock().await.remove(id);
        if removed.is_none() {
            return Err(SceneforgeError::validation(format!("unknown object '{id}'")));
        }
        self.history.save().await;
        Ok(())
    }

    /// Step back one history entry.
    pub async fn undo(&self) -> bool {
        self.history.undo().await
    }

    /// Step forward one history entry.
    pub async fn redo(&self) -> bool {
        self.history.redo().await
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/editor.rs"]
mod tests;
