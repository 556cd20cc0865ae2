//! Headless rendering of scenes and single layers.
//!
//! Rendering never touches an editor canvas: layers go through the render-only importer into an
//! offscreen object list, get compiled into [`DrawCommand`]s and are rasterized by a
//! [`RasterBackend`]. Identical input yields identical pixels.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument, warn};

use crate::assets::color::parse_css_color;
use crate::assets::loader::SharedLoader;
use crate::canvas::frame::is_absolute_clip;
use crate::canvas::object::{CanvasObject, Resource, layer_transform};
use crate::canvas::store::Canvas;
use crate::foundation::core::{Affine, BezPath, FrameSize, Rect, Shape as _};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::import::base::is_visual;
use crate::import::render_importer::RenderImporter;
use crate::layer::model::{Layer, LayerKind};
use crate::layer::types::{DEFAULT_BACKGROUND, defaults};
use crate::render::backend::{DrawCommand, FrameRGBA, RasterBackend};
use crate::render::cpu::CpuRasterBackend;
use crate::render::svg_raster::text_tree;
use crate::scene::model::Scene;

/// Options for [`Renderer::render_layer`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderLayerParams {
    /// Output pixels per layer unit.
    pub multiplier: f64,
    /// Fill behind the layer; transparent when `None`.
    pub background: Option<String>,
}

impl Default for RenderLayerParams {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            background: None,
        }
    }
}

/// Rasterizes scenes and single layers without touching a live canvas.
pub struct Renderer {
    importer: RenderImporter,
    backend: Mutex<Box<dyn RasterBackend>>,
}

impl Renderer {
    /// Renderer on the CPU backend.
    pub fn new(loader: SharedLoader) -> Self {
        Self::with_backend(loader, Box::new(CpuRasterBackend::new()))
    }

    /// Renderer drawing through `backend`.
    pub fn with_backend(loader: SharedLoader, backend: Box<dyn RasterBackend>) -> Self {
        Self {
            importer: RenderImporter::new(loader),
            backend: Mutex::new(backend),
        }
    }

    /// Render `scene` at frame size and encode it as a PNG data URL.
    pub async fn render(&self, scene: &Scene) -> SceneforgeResult<String> {
        self.render_canvas(scene).await?.to_data_url()
    }

    /// Render `scene` at frame size.
    #[instrument(level = "debug", skip_all, fields(scene = %scene.id))]
    pub async fn render_canvas(&self, scene: &Scene) -> SceneforgeResult<FrameRGBA> {
        self.render_scaled(scene, 1.0).await
    }

    /// Render `scene` scaled down so its longer side is at most `max_side` pixels.
    #[instrument(level = "debug", skip_all, fields(scene = %scene.id, max_side))]
    pub async fn render_thumbnail(
        &self,
        scene: &Scene,
        max_side: u32,
    ) -> SceneforgeResult<FrameRGBA> {
        if max_side == 0 {
            return Err(SceneforgeError::validation("thumbnail size must be > 0"));
        }
        scene.frame.validate()?;
        let longest = scene.frame.width.max(scene.frame.height);
        let scale = (f64::from(max_side) / longest).min(1.0);
        self.render_scaled(scene, scale).await
    }

    /// Render one layer cropped to its bounding box and encode it as a PNG data URL.
    pub async fn render_layer(
        &self,
        layer: &Layer,
        params: &RenderLayerParams,
    ) -> SceneforgeResult<String> {
        self.render_layer_frame(layer, params).await?.to_data_url()
    }

    /// Render one layer cropped to its bounding box, scaled by `params.multiplier`.
    #[instrument(level = "debug", skip_all, fields(id = layer.id().unwrap_or_default()))]
    pub async fn render_layer_frame(
        &self,
        layer: &Layer,
        params: &RenderLayerParams,
    ) -> SceneforgeResult<FrameRGBA> {
        let m = params.multiplier;
        if !(m.is_finite() && m > 0.0) {
            return Err(SceneforgeError::validation("multiplier must be > 0"));
        }
        let obj = self.importer.import(layer).await?;
        let bbox = obj.bounding_box();
        if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
            return Err(SceneforgeError::render(format!(
                "layer '{}' has an empty bounding box",
                obj.id()
            )));
        }
        let (w, h) = FrameSize {
            width: bbox.width() * m,
            height: bbox.height() * m,
        }
        .to_pixels();
        let view = Affine::scale(m) * Affine::translate((-bbox.x0, -bbox.y0));

        let mut commands = Vec::new();
        if let Some(bg) = params.background.as_deref()
            && let Some(color) = parse_css_color(bg)?
        {
            commands.push(DrawCommand::FillPath {
                path: Rect::new(0.0, 0.0, f64::from(w), f64::from(h)).to_path(0.1),
                transform: Affine::IDENTITY,
                color: color.to_rgba8(),
                opacity: 1.0,
            });
        }
        commands.extend(compile_objects(std::slice::from_ref(&obj), view));
        self.rasterize(w, h, &commands)
    }

    async fn render_scaled(&self, scene: &Scene, scale: f64) -> SceneforgeResult<FrameRGBA> {
        scene.frame.validate()?;
        let (objects, skipped) = self.importer.import_scene(&scene.layers, scene.frame).await;
        if !skipped.is_empty() {
            debug!(skipped = skipped.len(), "rendering without failed layers");
        }
        let mut canvas = Canvas::offscreen(scene.frame);
        for obj in objects {
            canvas.add(obj);
        }

        let (w, h) = FrameSize {
            width: scene.frame.width * scale,
            height: scene.frame.height * scale,
        }
        .to_pixels();
        let commands = compile_objects(canvas.objects(), Affine::scale(scale));
        self.rasterize(w, h, &commands)
    }

    fn rasterize(&self, w: u32, h: u32, commands: &[DrawCommand]) -> SceneforgeResult<FrameRGBA> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        backend.rasterize(w, h, commands)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("importer", &self.importer)
            .finish_non_exhaustive()
    }
}

/// Compile top-level objects (bottom first) into draw commands in device space.
///
/// An object that cannot be compiled is logged and left out; the others still draw.
pub fn compile_objects(objects: &[CanvasObject], view: Affine) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    for obj in objects {
        compile_isolated(obj, view, view, 1.0, &mut out);
    }
    out
}

fn compile_isolated(
    obj: &CanvasObject,
    parent: Affine,
    view: Affine,
    opacity: f64,
    out: &mut Vec<DrawCommand>,
) {
    let mut cmds = Vec::new();
    match compile_object(obj, parent, view, opacity, &mut cmds) {
        Ok(()) => out.extend(cmds),
        Err(error) => warn!(id = obj.id(), kind = %obj.layer_type(), error = %error, "object left out of render"),
    }
}

fn compile_object(
    obj: &CanvasObject,
    parent: Affine,
    view: Affine,
    parent_opacity: f64,
    out: &mut Vec<DrawCommand>,
) -> SceneforgeResult<()> {
    if !obj.is_renderable() || !is_visual(&obj.layer_type()) {
        return Ok(());
    }
    let base = &obj.layer.base;
    let opacity = parent_opacity * base.opacity().clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }
    let transform = parent * obj.transform();
    let (w, h) = (obj.width(), obj.height());
    let box_path = Rect::new(0.0, 0.0, w, h).to_path(0.1);
    let alpha = opacity as f32;

    let clipped = match base.clip_path.as_deref() {
        Some(clip) => {
            let space = if is_absolute_clip(clip) { view } else { transform };
            out.push(clip_command(clip, space)?);
            true
        }
        None => false,
    };

    let mut outline = Some(box_path.clone());
    if obj.is_placeholder() {
        fill(out, &box_path, transform, Some(defaults::PLACEHOLDER_FILL), alpha)?;
    } else {
        match (&obj.layer.kind, &obj.resource) {
            (LayerKind::Background(props), _) => {
                if let Some(shadow) = &base.shadow
                    && let Some(color) = parse_css_color(&shadow.color)?
                {
                    out.push(DrawCommand::FillPath {
                        path: box_path.clone(),
                        transform: transform
                            * Affine::translate((shadow.offset_x, shadow.offset_y)),
                        color: color.to_rgba8(),
                        opacity: alpha,
                    });
                }
                let color = props.fill.as_deref().unwrap_or(DEFAULT_BACKGROUND.fill);
                fill(out, &box_path, transform, Some(color), alpha)?;
            }
            (LayerKind::StaticPath(props), Resource::Path(path)) => {
                let color = props.fill.as_deref().unwrap_or(defaults::FILL);
                fill(out, path, transform, Some(color), alpha)?;
                outline = Some(path.clone());
            }
            (LayerKind::StaticImage(props) | LayerKind::BackgroundImage(props), Resource::Image(img)) => {
                out.push(DrawCommand::PushClip {
                    path: box_path.clone(),
                    transform,
                });
                out.push(DrawCommand::Image {
                    image: img.clone(),
                    transform: transform
                        * Affine::translate((
                            -props.crop_x.unwrap_or(0.0),
                            -props.crop_y.unwrap_or(0.0),
                        )),
                    opacity: alpha,
                });
                out.push(DrawCommand::PopClip);
            }
            (LayerKind::StaticVideo(_), Resource::VideoFrame(frame)) => {
                let img = &frame.image;
                out.push(DrawCommand::Image {
                    image: img.clone(),
                    transform: transform * fit(w, h, f64::from(img.width), f64::from(img.height)),
                    opacity: alpha,
                });
            }
            (LayerKind::StaticVector(_), Resource::Vector(vector)) => {
                out.push(DrawCommand::Svg {
                    tree: vector.tree.clone(),
                    transform: transform * fit(w, h, vector.width, vector.height),
                    opacity: alpha,
                });
            }
            (LayerKind::StaticText(props), resource) => {
                let font = match resource {
                    Resource::Font(bytes) => Some(bytes.as_slice()),
                    _ => None,
                };
                let tree = text_tree(props, w, h, font)?;
                let size = tree.size();
                out.push(DrawCommand::Svg {
                    transform: transform
                        * fit(w, h, f64::from(size.width()), f64::from(size.height())),
                    tree,
                    opacity: alpha,
                });
                outline = None;
            }
            (LayerKind::GenerationFrame(props), _) => {
                fill(out, &box_path, transform, props.fill.as_deref(), alpha)?;
                for child in &obj.children {
                    compile_isolated(child, transform, view, opacity, out);
                }
            }
            (LayerKind::Group(_), _) => {
                for child in &obj.children {
                    compile_isolated(child, transform, view, opacity, out);
                }
                outline = None;
            }
            // Eraser strokes are masks, never paint.
            (LayerKind::Eraser(_), _) => outline = None,
            (kind, _) => {
                return Err(SceneforgeError::render(format!(
                    "{} object has no loaded resource",
                    kind.layer_type()
                )));
            }
        }
    }

    if let (Some(path), Some(stroke)) = (outline, base.stroke.as_deref())
        && base.stroke_width() > 0.0
        && let Some(color) = parse_css_color(stroke)?
    {
        out.push(DrawCommand::StrokePath {
            path,
            transform,
            color: color.to_rgba8(),
            width: base.stroke_width(),
            opacity: alpha,
        });
    }

    if clipped {
        out.push(DrawCommand::PopClip);
    }
    Ok(())
}

/// Scale content of intrinsic size `iw` x `ih` onto a `w` x `h` box.
fn fit(w: f64, h: f64, iw: f64, ih: f64) -> Affine {
    if iw <= 0.0 || ih <= 0.0 {
        return Affine::IDENTITY;
    }
    Affine::scale_non_uniform(w / iw, h / ih)
}

fn fill(
    out: &mut Vec<DrawCommand>,
    path: &BezPath,
    transform: Affine,
    color: Option<&str>,
    opacity: f32,
) -> SceneforgeResult<()> {
    if let Some(css) = color
        && let Some(color) = parse_css_color(css)?
    {
        out.push(DrawCommand::FillPath {
            path: path.clone(),
            transform,
            color: color.to_rgba8(),
            opacity,
        });
    }
    Ok(())
}

/// Clip command for `clip` placed in `space` (object space, or view space for absolute clips).
fn clip_command(clip: &Layer, space: Affine) -> SceneforgeResult<DrawCommand> {
    let w = clip.base.width.unwrap_or(0.0);
    let h = clip.base.height.unwrap_or(0.0);
    let path = match &clip.kind {
        LayerKind::StaticPath(p) if p.path.as_deref().is_some_and(|d| !d.trim().is_empty()) => {
            BezPath::from_svg(p.path.as_deref().unwrap_or_default())
                .map_err(|e| SceneforgeError::render(format!("invalid clip path data: {e}")))?
        }
        _ => Rect::new(0.0, 0.0, w, h).to_path(0.1),
    };
    Ok(DrawCommand::PushClip {
        path,
        transform: space * layer_transform(&clip.base, w, h),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
