//! CPU raster backend on `vello_cpu`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Point};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::render::backend::{DrawCommand, FrameRGBA, RasterBackend};
use crate::render::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_params};

/// Cached paints are dropped wholesale once a cache grows past this.
const CACHE_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    tree: usize,
    width: u32,
    height: u32,
}

/// Paints are keyed by the address of their shared source; the cache holds a clone of that
/// source so the address cannot be reused while the entry lives.
#[derive(Default)]
pub struct CpuRasterBackend {
    image_cache: HashMap<usize, (Arc<Vec<u8>>, vello_cpu::Image)>,
    svg_cache: HashMap<SvgRasterKey, (Arc<usvg::Tree>, vello_cpu::Image)>,
}

impl CpuRasterBackend {
    /// Backend with empty caches.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for CpuRasterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRasterBackend")
            .field("images", &self.image_cache.len())
            .field("svgs", &self.svg_cache.len())
            .finish()
    }
}

impl RasterBackend for CpuRasterBackend {
    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        commands: &[DrawCommand],
    ) -> SceneforgeResult<FrameRGBA> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| SceneforgeError::render("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| SceneforgeError::render("surface height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        let mut clips = 0usize;
        for cmd in commands {
            match cmd {
                DrawCommand::PushClip { .. } => clips += 1,
                DrawCommand::PopClip => {
                    if clips == 0 {
                        return Err(SceneforgeError::render("unbalanced clip pop"));
                    }
                    clips -= 1;
                }
                _ => {}
            }
            self.draw(&mut ctx, cmd)?;
        }
        for _ in 0..clips {
            ctx.pop_layer();
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuRasterBackend {
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        cmd: &DrawCommand,
    ) -> SceneforgeResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match cmd {
            DrawCommand::FillPath {
                path,
                transform,
                color,
                opacity,
            } => {
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(color_to_cpu(*color));
                with_opacity(ctx, *opacity, |ctx| ctx.fill_path(&bezpath_to_cpu(path)));
            }
            DrawCommand::StrokePath {
                path,
                transform,
                color,
                width,
                opacity,
            } => {
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                with_opacity(ctx, *opacity, |ctx| ctx.stroke_path(&bezpath_to_cpu(path)));
            }
            DrawCommand::Image {
                image,
                transform,
                opacity,
            } => {
                let paint = self.image_paint_for(&image.rgba8_premul, image.width, image.height)?;
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(paint);
                let rect =
                    vello_cpu::kurbo::Rect::new(0.0, 0.0, image.width as f64, image.height as f64);
                with_opacity(ctx, *opacity, |ctx| ctx.fill_rect(&rect));
            }
            DrawCommand::Svg {
                tree,
                transform,
                opacity,
            } => {
                let (paint, w, h, transform_adjust) = self.svg_paint_for(tree, *transform)?;
                ctx.set_transform(affine_to_cpu(transform_adjust));
                ctx.set_paint(paint);
                let rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h);
                with_opacity(ctx, *opacity, |ctx| ctx.fill_rect(&rect));
            }
            DrawCommand::PushClip { path, transform } => {
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.push_clip_layer(&bezpath_to_cpu(path));
            }
            DrawCommand::PopClip => ctx.pop_layer(),
        }
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        pixels: &Arc<Vec<u8>>,
        width: u32,
        height: u32,
    ) -> SceneforgeResult<vello_cpu::Image> {
        let key = Arc::as_ptr(pixels) as usize;
        if let Some((_, paint)) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }
        let pixmap = image_premul_bytes_to_pixmap(pixels.as_slice(), width, height)?;
        let paint = image_paint(pixmap);
        if self.image_cache.len() >= CACHE_CAPACITY {
            self.image_cache.clear();
        }
        self.image_cache
            .insert(key, (Arc::clone(pixels), paint.clone()));
        Ok(paint)
    }

    fn svg_paint_for(
        &mut self,
        tree: &Arc<usvg::Tree>,
        transform: Affine,
    ) -> SceneforgeResult<(vello_cpu::Image, f64, f64, Affine)> {
        let (w, h, transform_adjust) = svg_raster_params(tree, transform)?;
        let key = SvgRasterKey {
            tree: Arc::as_ptr(tree) as usize,
            width: w,
            height: h,
        };
        if let Some((_, paint)) = self.svg_cache.get(&key) {
            return Ok((paint.clone(), w as f64, h as f64, transform_adjust));
        }

        let rgba8_premul = rasterize_svg_to_premul_rgba8(tree, w, h)?;
        let pixmap = image_premul_bytes_to_pixmap(rgba8_premul.as_slice(), w, h)?;
        let paint = image_paint(pixmap);
        if self.svg_cache.len() >= CACHE_CAPACITY {
            self.svg_cache.clear();
        }
        self.svg_cache
            .insert(key, (Arc::clone(tree), paint.clone()));
        Ok((paint, w as f64, h as f64, transform_adjust))
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
        draw(ctx);
        ctx.pop_layer();
    } else {
        draw(ctx);
    }
}

fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn color_to_cpu([r, g, b, a]: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SceneforgeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SceneforgeError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SceneforgeError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SceneforgeError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
