//! Interactive importer: turns stored layers into objects on the live canvas.

use tracing::instrument;

use crate::assets::loader::SharedLoader;
use crate::canvas::object::CanvasObject;
use crate::foundation::core::Vec2;
use crate::foundation::error::SceneforgeResult;
use crate::import::base::{self, ImportContext, Placement};
use crate::layer::model::Layer;

/// Frame-relative placement: top-level objects are shifted by the frame corner, group children
/// stay in their container's local space.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameRelative;

impl Placement for FrameRelative {
    fn offset_for(&self, ctx: &ImportContext) -> Option<Vec2> {
        if ctx.inside_group {
            None
        } else {
            Some(ctx.offset)
        }
    }
}

/// Importer used by the scene controller and history restore.
#[derive(Clone)]
pub struct ObjectImporter {
    loader: SharedLoader,
}

impl ObjectImporter {
    /// Importer fetching resources through `loader`.
    pub fn new(loader: SharedLoader) -> Self {
        Self { loader }
    }

    /// Loader used for resources.
    pub fn loader(&self) -> &SharedLoader {
        &self.loader
    }

    /// Import one layer. Resource failures reject this layer only; the caller decides what to do.
    #[instrument(level = "debug", skip_all, fields(id = layer.id().unwrap_or_default()))]
    pub async fn import(
        &self,
        layer: &Layer,
        ctx: ImportContext,
    ) -> SceneforgeResult<CanvasObject> {
        base::import_with(self.loader.as_ref(), &FrameRelative, layer, ctx).await
    }
}

impl std::fmt::Debug for ObjectImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectImporter").finish_non_exhaustive()
    }
}
