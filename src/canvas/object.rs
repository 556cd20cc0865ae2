//! Live canvas objects.
//!
//! A [`CanvasObject`] is a layer after import: every defaulted attribute filled in, coordinates in
//! canvas space (or group-local space for children), and its external resource resolved.

use std::sync::Arc;

use crate::assets::decode::{DecodedImage, VectorAsset};
use crate::assets::media::VideoFrame;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::layer::model::{Layer, LayerBase, LayerKind};
use crate::layer::types::LayerType;

/// External data a live object draws from.
#[derive(Clone, Debug, Default)]
pub enum Resource {
    /// Nothing to load (fills, groups, audio, structural helpers).
    #[default]
    None,
    /// Decoded bitmap.
    Image(DecodedImage),
    /// Parsed SVG.
    Vector(VectorAsset),
    /// Video frame captured at the seek position.
    VideoFrame(VideoFrame),
    /// Parsed path geometry of a [`LayerType::StaticPath`].
    Path(BezPath),
    /// Font file bytes for a text layer with a `fontURL`.
    Font(Arc<Vec<u8>>),
}

/// One object on a [`Canvas`](crate::canvas::store::Canvas).
#[derive(Clone, Debug)]
pub struct CanvasObject {
    /// Normalized attributes. Container children live in [`CanvasObject::children`], not here.
    pub layer: Layer,
    /// What the object draws from.
    pub resource: Resource,
    /// Live children of containers, bottom first, in the container's local space.
    pub children: Vec<CanvasObject>,
    placeholder: bool,
}

impl CanvasObject {
    /// Leaf object.
    pub fn new(layer: Layer, resource: Resource) -> Self {
        Self {
            layer,
            resource,
            children: Vec::new(),
            placeholder: false,
        }
    }

    /// Container object. Any children stored in `layer` are replaced by `children` on serialize.
    pub fn container(mut layer: Layer, children: Vec<CanvasObject>) -> Self {
        if let Some(objects) = layer.children_mut() {
            objects.clear();
        }
        Self {
            layer,
            resource: Resource::None,
            children,
            placeholder: false,
        }
    }

    /// Opaque rectangle standing in for a layer that could not be interpreted.
    pub fn placeholder(layer: Layer) -> Self {
        Self {
            layer,
            resource: Resource::None,
            children: Vec::new(),
            placeholder: true,
        }
    }

    /// Object id, empty when the layer has none.
    pub fn id(&self) -> &str {
        self.layer.id().unwrap_or_default()
    }

    /// Type tag.
    pub fn layer_type(&self) -> LayerType {
        self.layer.layer_type()
    }

    /// Whether this stands in for a layer that could not be interpreted.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Whether this object may be exported, snapshotted and drawn.
    pub fn is_renderable(&self) -> bool {
        self.layer.is_renderable()
    }

    /// Unscaled width, `0.0` when unset.
    pub fn width(&self) -> f64 {
        self.layer.base.width.unwrap_or(0.0)
    }

    /// Unscaled height, `0.0` when unset.
    pub fn height(&self) -> f64 {
        self.layer.base.height.unwrap_or(0.0)
    }

    /// Maps local box space (`0..width`, `0..height`) into the parent's space.
    pub fn transform(&self) -> Affine {
        layer_transform(&self.layer.base, self.width(), self.height())
    }

    /// Axis-aligned bounds in the parent's space.
    pub fn bounding_box(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(Rect::new(0.0, 0.0, self.width(), self.height()))
    }

    /// Whether `point` (parent space) falls inside this object's box.
    pub fn contains_point(&self, point: Point) -> bool {
        let det = self.transform().determinant();
        if det.abs() < f64::EPSILON {
            return false;
        }
        let local = self.transform().inverse() * point;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.width() && local.y <= self.height()
    }

    /// Plain-data projection, children included.
    pub fn to_layer(&self) -> Layer {
        let mut layer = self.layer.clone();
        if let Some(objects) = layer.children_mut() {
            *objects = self.children.iter().map(CanvasObject::to_layer).collect();
        }
        layer
    }

    /// Depth-first search by id, this object included.
    pub fn find(&self, id: &str) -> Option<&CanvasObject> {
        if self.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Mutable lookup of this object or a descendant by id.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut CanvasObject> {
        if self.id() == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Distinct leaf types under this object, containers looked through.
    pub fn leaf_types(&self, out: &mut Vec<LayerType>) {
        match &self.layer.kind {
            LayerKind::Group(_) | LayerKind::GenerationFrame(_) | LayerKind::Eraser(_)
                if !self.children.is_empty() =>
            {
                for c in &self.children {
                    c.leaf_types(out);
                }
            }
            _ => {
                let t = self.layer_type();
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
    }
}

fn origin_factor(origin: Option<&str>) -> f64 {
    match origin {
        Some("center") => 0.5,
        Some("right") | Some("bottom") => 1.0,
        _ => 0.0,
    }
}

/// Object transform: origin anchor at (`left`, `top`), then rotation, skew, scale; flips mirror
/// the box about its own center.
pub fn layer_transform(base: &LayerBase, width: f64, height: f64) -> Affine {
    let ox = origin_factor(base.origin_x.as_deref()) * width;
    let oy = origin_factor(base.origin_y.as_deref()) * height;
    let fx = if base.flip_x.unwrap_or(false) { -1.0 } else { 1.0 };
    let fy = if base.flip_y.unwrap_or(false) { -1.0 } else { 1.0 };
    let skew_x = base.skew_x.unwrap_or(0.0).to_radians().tan();
    let skew_y = base.skew_y.unwrap_or(0.0).to_radians().tan();

    let flip = Affine::translate((width / 2.0, height / 2.0))
        * Affine::scale_non_uniform(fx, fy)
        * Affine::translate((-width / 2.0, -height / 2.0));

    Affine::translate((base.left(), base.top()))
        * Affine::rotate(base.angle().to_radians())
        * Affine::skew(skew_x, skew_y)
        * Affine::scale_non_uniform(base.scale_x(), base.scale_y())
        * Affine::translate((-ox, -oy))
        * flip
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/object.rs"]
mod tests;
