//! The live canvas: an ordered object list plus frame, selection and viewport state.

use std::sync::Arc;

use crate::canvas::frame::FrameController;
use crate::canvas::object::CanvasObject;
use crate::config::{EditorConfig, ViewportConfig};
use crate::foundation::core::{FrameSize, Point};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::layer::model::Layer;
use crate::layer::types::LayerType;

/// Canvas shared between the scene controller, history and editor.
pub type CanvasHandle = Arc<tokio::sync::Mutex<Canvas>>;

/// Ordered set of live objects. Vector order is z-order, bottom first.
///
/// A single `Background` object is pinned to index 0 and `BackgroundImage`s directly above it.
#[derive(Debug)]
pub struct Canvas {
    objects: Vec<CanvasObject>,
    frame: FrameController,
    selection: Vec<String>,
    zoom: f64,
    render_requests: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(FrameController::default())
    }
}

impl Canvas {
    /// Empty canvas around `frame`.
    pub fn new(frame: FrameController) -> Self {
        Self {
            objects: Vec::new(),
            frame,
            selection: Vec::new(),
            zoom: 1.0,
            render_requests: 0,
        }
    }

    /// Empty canvas with the configured frame.
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self::new(FrameController::from_config(&cfg.frame))
    }

    /// Offscreen canvas with the frame at the origin.
    pub fn offscreen(size: FrameSize) -> Self {
        Self::new(FrameController::offscreen(size))
    }

    /// Share the canvas behind a [`CanvasHandle`].
    pub fn into_handle(self) -> CanvasHandle {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// The artboard.
    pub fn frame(&self) -> &FrameController {
        &self.frame
    }

    /// Mutable access to the artboard.
    pub fn frame_mut(&mut self) -> &mut FrameController {
        &mut self.frame
    }

    /// Top-level objects, bottom first.
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the canvas holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn pinned_count(&self) -> usize {
        self.objects
            .iter()
            .take_while(|o| {
                matches!(
                    o.layer_type(),
                    LayerType::Background | LayerType::BackgroundImage
                )
            })
            .count()
    }

    /// Add on top, except background kinds which go to their pinned slots.
    ///
    /// A new `Background` replaces the current one. `BackgroundImage`s stack above the
    /// background and any earlier background images, in insertion order.
    pub fn add(&mut self, object: CanvasObject) {
        match object.layer_type() {
            LayerType::Background => {
                let has_background = self
                    .objects
                    .first()
                    .is_some_and(|o| o.layer_type() == LayerType::Background);
                if has_background {
                    let old = std::mem::replace(&mut self.objects[0], object);
                    self.selection.retain(|s| s != old.id());
                } else {
                    self.objects.insert(0, object);
                }
            }
            LayerType::BackgroundImage => {
                let idx = self.pinned_count();
                self.objects.insert(idx, object);
            }
            _ => self.objects.push(object),
        }
        self.request_render();
    }

    /// Insert at `index`, clamped so pinned background slots stay below.
    pub fn insert_at(&mut self, index: usize, object: CanvasObject) {
        if matches!(
            object.layer_type(),
            LayerType::Background | LayerType::BackgroundImage
        ) {
            return self.add(object);
        }
        let idx = index.clamp(self.pinned_count(), self.objects.len());
        self.objects.insert(idx, object);
        self.request_render();
    }

    /// Remove a top-level or nested object by id.
    pub fn remove(&mut self, id: &str) -> Option<CanvasObject> {
        let removed = remove_from(&mut self.objects, id)?;
        self.selection.retain(|s| s != id);
        self.request_render();
        Some(removed)
    }

    /// Swap the object with `id` for `object` in place, keeping its z-order slot.
    pub fn replace(&mut self, id: &str, object: CanvasObject) -> SceneforgeResult<CanvasObject> {
        let slot = self
            .find_mut(id)
            .ok_or_else(|| SceneforgeError::validation(format!("unknown object '{id}'")))?;
        let old = std::mem::replace(slot, object);
        self.request_render();
        Ok(old)
    }

    /// Drop every object. The frame stays.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selection.clear();
        self.request_render();
    }

    /// Top-level or nested object by id.
    pub fn find(&self, id: &str) -> Option<&CanvasObject> {
        self.objects.iter().find_map(|o| o.find(id))
    }

    /// Mutable top-level or nested object by id.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find_map(|o| o.find_mut(id))
    }

    /// Canvas-space plain data: the frame layer first, then every object bottom to top.
    pub fn to_layers(&self) -> Vec<Layer> {
        std::iter::once(self.frame.to_layer())
            .chain(self.objects.iter().map(CanvasObject::to_layer))
            .collect()
    }

    /// Topmost renderable top-level object under `point` (canvas space).
    pub fn object_at(&self, point: Point) -> Option<&CanvasObject> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.is_renderable())
            .find(|o| o.contains_point(point))
    }

    /// Select a single object.
    pub fn set_active(&mut self, id: &str) -> SceneforgeResult<()> {
        self.set_selection(&[id])
    }

    /// Select several top-level objects.
    pub fn set_selection(&mut self, ids: &[&str]) -> SceneforgeResult<()> {
        for id in ids {
            if self.find(id).is_none() {
                return Err(SceneforgeError::validation(format!(
                    "cannot select unknown object '{id}'"
                )));
            }
        }
        self.selection = ids.iter().map(|s| s.to_string()).collect();
        Ok(())
    }

    /// Clear the selection. Returns whether anything was selected.
    pub fn discard_active(&mut self) -> bool {
        let had = !self.selection.is_empty();
        self.selection.clear();
        had
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Selected objects in z-order.
    pub fn selected_objects(&self) -> Vec<&CanvasObject> {
        self.selection.iter().filter_map(|id| self.find(id)).collect()
    }

    /// Current viewport zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom so the whole frame fits `fit_ratio` of the viewport.
    pub fn fit_zoom(&mut self, viewport: &ViewportConfig) -> f64 {
        let size = self.frame.size();
        let zx = viewport.width / size.width;
        let zy = viewport.height / size.height;
        let zoom = zx.min(zy) * viewport.fit_ratio;
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
        self.request_render();
        self.zoom
    }

    /// Ask for a repaint.
    pub fn request_render(&mut self) {
        self.render_requests += 1;
    }

    /// Number of repaint requests so far.
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }
}

fn remove_from(objects: &mut Vec<CanvasObject>, id: &str) -> Option<CanvasObject> {
    if let Some(pos) = objects.iter().position(|o| o.id() == id) {
        return Some(objects.remove(pos));
    }
    objects
        .iter_mut()
        .find_map(|o| remove_from(&mut o.children, id))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/store.rs"]
mod tests;
