//! Render-only importer.
//!
//! Renders lay layers out at their declared coordinates: no frame offset is ever applied and
//! nothing touches live editor state. Generation frames still drop structural children; plain
//! groups keep everything.

use std::sync::Arc;

use tracing::warn;

use crate::assets::loader::SharedLoader;
use crate::canvas::object::CanvasObject;
use crate::foundation::core::{FrameSize, Vec2};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::import::base::{self, ImportContext, Placement};
use crate::layer::model::Layer;

#[derive(Clone, Copy, Debug, Default)]
struct Declared;

impl Placement for Declared {
    fn offset_for(&self, _ctx: &ImportContext) -> Option<Vec2> {
        None
    }
}

/// A layer the renderer had to leave out.
#[derive(Debug)]
pub struct SkippedLayer {
    /// Position in the input list.
    pub index: usize,
    /// Layer id, if it had one.
    pub id: Option<String>,
    /// Why it was skipped.
    pub error: SceneforgeError,
}

/// Importer for headless renders. Layers keep their declared, already absolute coordinates.
#[derive(Clone)]
pub struct RenderImporter {
    loader: SharedLoader,
}

impl RenderImporter {
    /// Importer fetching resources through `loader`.
    pub fn new(loader: SharedLoader) -> Self {
        Self { loader }
    }

    /// Import one layer at its declared position.
    pub async fn import(&self, layer: &Layer) -> SceneforgeResult<CanvasObject> {
        self.import_in(layer, ImportContext::absolute()).await
    }

    async fn import_in(&self, layer: &Layer, ctx: ImportContext) -> SceneforgeResult<CanvasObject> {
        base::import_with(self.loader.as_ref(), &Declared, layer, ctx).await
    }

    /// Import `layers` one after another in declared order. Failures are logged and skipped.
    pub async fn import_all(&self, layers: &[Layer]) -> (Vec<CanvasObject>, Vec<SkippedLayer>) {
        self.import_all_in(layers, ImportContext::absolute()).await
    }

    /// [`RenderImporter::import_all`] for a scene: full-frame layers that omit their size get
    /// `frame`.
    pub async fn import_scene(
        &self,
        layers: &[Layer],
        frame: FrameSize,
    ) -> (Vec<CanvasObject>, Vec<SkippedLayer>) {
        let ctx = ImportContext {
            frame: Some(frame),
            ..ImportContext::absolute()
        };
        self.import_all_in(layers, ctx).await
    }

    async fn import_all_in(
        &self,
        layers: &[Layer],
        ctx: ImportContext,
    ) -> (Vec<CanvasObject>, Vec<SkippedLayer>) {
        let mut objects = Vec::with_capacity(layers.len());
        let mut skipped = Vec::new();
        for (index, layer) in layers.iter().enumerate() {
            if !layer.is_renderable() {
                continue;
            }
            match self.import_in(layer, ctx).await {
                Ok(obj) => objects.push(obj),
                Err(error) => {
                    warn!(index, id = ?layer.id(), kind = %layer.layer_type(), error = %error, "layer left out of render");
                    skipped.push(SkippedLayer {
                        index,
                        id: layer.id().map(str::to_string),
                        error,
                    });
                }
            }
        }
        (objects, skipped)
    }
}

impl std::fmt::Debug for RenderImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderImporter")
            .field("loader", &Arc::strong_count(&self.loader))
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/import/render_importer.rs"]
mod tests;
