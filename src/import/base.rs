//! Pieces shared by both importers: attribute defaulting, resource resolution and per-type
//! construction.
//!
//! The importers differ only in how they place objects, so each supplies a [`Placement`] and
//! everything else runs through [`import_with`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::assets::loader::ResourceLoader;
use crate::assets::{decode, vector};
use crate::canvas::object::{CanvasObject, Resource};
use crate::foundation::core::{BezPath, FrameSize, Shape as _, Vec2};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::foundation::ids;
use crate::layer::model::{Layer, LayerBase, LayerKind, TextProps};
use crate::layer::types::{DEFAULT_FRAME, LayerType, defaults};

/// Boxed import future; containers recurse through it.
pub type ImportFuture<'a> = Pin<Box<dyn Future<Output = SceneforgeResult<CanvasObject>> + Send + 'a>>;

/// Where a layer sits relative to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportContext {
    /// Added to `left`/`top` of objects outside groups.
    pub offset: Vec2,
    /// Set for children of a container; they keep local coordinates.
    pub inside_group: bool,
    /// Size given to full-frame layers (Background) that omit their own.
    pub frame: Option<FrameSize>,
}

impl ImportContext {
    /// Top-level object of a frame whose corner sits at `offset`.
    pub fn frame(offset: Vec2, frame: FrameSize) -> Self {
        Self {
            offset,
            inside_group: false,
            frame: Some(frame),
        }
    }

    /// Coordinates are already canvas space.
    pub fn absolute() -> Self {
        Self {
            offset: Vec2::ZERO,
            inside_group: false,
            frame: None,
        }
    }

    fn child(self) -> Self {
        Self {
            offset: Vec2::ZERO,
            inside_group: true,
            frame: self.frame,
        }
    }
}

/// Positioning rule of an importer variant.
pub trait Placement: Send + Sync {
    /// Offset applied to this layer's `left`/`top`, `None` for none.
    fn offset_for(&self, ctx: &ImportContext) -> Option<Vec2>;
}

/// Fill documented defaults. `id` is generated when blank and `name` falls back to the type tag.
/// `stroke` is never defaulted.
pub fn base_options(layer: &Layer, offset: Option<Vec2>) -> LayerBase {
    let src = &layer.base;
    let mut base = src.clone();
    base.id = Some(ids::id_or_new(src.id.as_deref()));
    base.name = Some(
        src.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| layer.layer_type().as_str().to_string()),
    );
    let shift = offset.unwrap_or(Vec2::ZERO);
    base.left = Some(src.left() + shift.x);
    base.top = Some(src.top() + shift.y);
    base.scale_x = Some(src.scale_x());
    base.scale_y = Some(src.scale_y());
    base.angle = Some(src.angle());
    base.flip_x = Some(src.flip_x.unwrap_or(false));
    base.flip_y = Some(src.flip_y.unwrap_or(false));
    base.skew_x = Some(src.skew_x.unwrap_or(0.0));
    base.skew_y = Some(src.skew_y.unwrap_or(0.0));
    base.origin_x = Some(
        src.origin_x
            .clone()
            .unwrap_or_else(|| defaults::ORIGIN_X.to_string()),
    );
    base.origin_y = Some(
        src.origin_y
            .clone()
            .unwrap_or_else(|| defaults::ORIGIN_Y.to_string()),
    );
    base.opacity = Some(src.opacity());
    base.stroke_width = Some(src.stroke_width());
    base.stroke_line_cap = Some(
        src.stroke_line_cap
            .clone()
            .unwrap_or_else(|| defaults::STROKE_LINE_CAP.to_string()),
    );
    base.stroke_line_join = Some(
        src.stroke_line_join
            .clone()
            .unwrap_or_else(|| defaults::STROKE_LINE_JOIN.to_string()),
    );
    base.stroke_miter_limit = Some(
        src.stroke_miter_limit
            .unwrap_or(defaults::STROKE_MITER_LIMIT),
    );
    base.stroke_uniform = Some(src.stroke_uniform.unwrap_or(false));
    base
}

/// Import one layer using `placement` for positioning.
pub fn import_with<'a, P: Placement>(
    loader: &'a dyn ResourceLoader,
    placement: &'a P,
    layer: &'a Layer,
    ctx: ImportContext,
) -> ImportFuture<'a> {
    Box::pin(async move {
        let base = base_options(layer, placement.offset_for(&ctx));
        let mut normalized = Layer {
            base,
            kind: layer.kind.clone(),
        };
        debug!(id = normalized.id().unwrap_or_default(), kind = %layer.layer_type(), "import layer");

        match &layer.kind {
            LayerKind::Group(g) | LayerKind::Eraser(g) => {
                let mut children = Vec::with_capacity(g.objects.len());
                for child in &g.objects {
                    children.push(import_with(loader, placement, child, ctx.child()).await?);
                }
                Ok(CanvasObject::container(normalized, children))
            }
            LayerKind::GenerationFrame(g) => {
                let mut children = Vec::with_capacity(g.objects.len());
                for child in g.objects.iter().filter(|c| c.is_renderable()) {
                    children.push(import_with(loader, placement, child, ctx.child()).await?);
                }
                if let Some(meta) = normalized.base.metadata.as_mut() {
                    crate::layer::generation::strip_transient(meta);
                }
                Ok(CanvasObject::container(normalized, children))
            }
            LayerKind::Unknown { .. } => {
                normalized.base.width.get_or_insert(100.0);
                normalized.base.height.get_or_insert(100.0);
                Ok(CanvasObject::placeholder(normalized))
            }
            _ => {
                let resource = resolve_resource(loader, &normalized).await?;
                apply_intrinsic_size(&mut normalized, &resource, ctx.frame);
                Ok(CanvasObject::new(normalized, resource))
            }
        }
    })
}

/// Load and decode whatever external data a leaf layer needs.
pub async fn resolve_resource(
    loader: &dyn ResourceLoader,
    layer: &Layer,
) -> SceneforgeResult<Resource> {
    match &layer.kind {
        LayerKind::StaticImage(p) | LayerKind::BackgroundImage(p) => {
            let src = required_src(p.src.as_deref(), layer)?;
            let bytes = loader.load_bytes(src).await?;
            Ok(Resource::Image(decode::decode_image(&bytes)?))
        }
        LayerKind::StaticVideo(p) => {
            let src = required_src(p.src.as_deref(), layer)?;
            Ok(Resource::VideoFrame(loader.load_video_frame(src, 0.0).await?))
        }
        LayerKind::StaticVector(p) => {
            let src = required_src(p.src.as_deref(), layer)?;
            let bytes = loader.load_bytes(src).await?;
            Ok(Resource::Vector(vector::load_vector(
                &bytes,
                p.color_map.as_ref(),
            )?))
        }
        LayerKind::StaticPath(p) => {
            let d = p.path.as_deref().unwrap_or_default().trim();
            if d.is_empty() {
                return Err(SceneforgeError::import(format!(
                    "path layer '{}' has no path data",
                    layer.id().unwrap_or_default()
                )));
            }
            BezPath::from_svg(d)
                .map(Resource::Path)
                .map_err(|e| SceneforgeError::import(format!("invalid svg path data: {e}")))
        }
        LayerKind::StaticText(TextProps {
            font_url: Some(url),
            ..
        }) if !url.is_empty() => {
            let bytes = loader.load_bytes(url).await?;
            Ok(Resource::Font(Arc::new(bytes)))
        }
        _ => Ok(Resource::None),
    }
}

fn required_src<'a>(src: Option<&'a str>, layer: &Layer) -> SceneforgeResult<&'a str> {
    src.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
        SceneforgeError::import(format!(
            "{} layer '{}' has no src",
            layer.layer_type(),
            layer.id().unwrap_or_default()
        ))
    })
}

/// Fill `width`/`height` the layer omitted from its resource.
pub fn apply_intrinsic_size(layer: &mut Layer, resource: &Resource, frame: Option<FrameSize>) {
    let intrinsic = match (&layer.kind, resource) {
        (_, Resource::Image(img)) => Some((f64::from(img.width), f64::from(img.height))),
        (_, Resource::VideoFrame(f)) => {
            Some((f64::from(f.image.width), f64::from(f.image.height)))
        }
        (_, Resource::Vector(v)) => Some((v.width, v.height)),
        (_, Resource::Path(p)) => {
            let bb = p.bounding_box();
            Some((bb.x1.max(0.0), bb.y1.max(0.0)))
        }
        (LayerKind::StaticText(t), _) => Some(estimate_text_size(t)),
        (LayerKind::Background(_), _) => {
            let f = frame.unwrap_or(FrameSize {
                width: DEFAULT_FRAME.width,
                height: DEFAULT_FRAME.height,
            });
            Some((f.width, f.height))
        }
        _ => None,
    };
    if let Some((w, h)) = intrinsic {
        layer.base.width.get_or_insert(w);
        layer.base.height.get_or_insert(h);
    }
}

/// Rough text box: 0.6em per character on the longest line, `lineHeight` per line.
pub fn estimate_text_size(text: &TextProps) -> (f64, f64) {
    let font_size = text.font_size.unwrap_or(defaults::FONT_SIZE);
    let line_height = text.line_height.unwrap_or(defaults::LINE_HEIGHT);
    let body = text.text.as_deref().unwrap_or_default();
    let lines: Vec<&str> = body.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (longest as f64 * font_size * 0.6).max(1.0);
    let height = lines.len() as f64 * font_size * line_height;
    (width, height)
}

/// Whether `t` is rendered at all.
pub fn is_visual(t: &LayerType) -> bool {
    !t.is_non_renderable() && !t.is_silent()
}

#[cfg(test)]
#[path = "../../tests/unit/import/base.rs"]
mod tests;
