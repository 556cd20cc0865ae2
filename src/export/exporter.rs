//! Canvas objects back to portable layers.
//!
//! Export is synchronous and pure: it works on the plain-data projection of live objects
//! ([`Canvas::to_layers`](crate::canvas::store::Canvas::to_layers)) and never loads anything.

use crate::canvas::frame::is_absolute_clip;
use crate::foundation::core::Vec2;
use crate::layer::generation::strip_transient;
use crate::layer::model::Layer;

/// Make one canvas-space layer frame-relative.
///
/// Top-level coordinates lose the frame offset. Container children are already local to their
/// container, so they recurse with a zero offset. Structural children are dropped, canvas-space
/// clips (the frame clip) are dropped, and transient generation metadata is stripped.
pub fn export_layer(layer: &Layer, frame_offset: Vec2) -> Layer {
    let mut out = layer.clone();
    out.base.left = Some(layer.base.left() - frame_offset.x);
    out.base.top = Some(layer.base.top() - frame_offset.y);

    if out.base.clip_path.as_deref().is_some_and(is_absolute_clip) {
        out.base.clip_path = None;
    }
    if let Some(meta) = out.base.metadata.as_mut() {
        strip_transient(meta);
    }
    if let Some(children) = out.children_mut() {
        let exported: Vec<Layer> = children
            .iter()
            .filter(|c| c.is_renderable())
            .map(|c| export_layer(c, Vec2::ZERO))
            .collect();
        *children = exported;
    }
    out
}

/// Export a canvas snapshot, dropping structural layers.
pub fn export_layers(layers: &[Layer], frame_offset: Vec2) -> Vec<Layer> {
    layers
        .iter()
        .filter(|l| l.is_renderable())
        .map(|l| export_layer(l, frame_offset))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
