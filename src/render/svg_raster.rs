//! SVG rasterization, and text drawn by way of a generated SVG document.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::color::parse_css_color;
use crate::assets::fonts;
use crate::foundation::core::Affine;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::layer::model::TextProps;
use crate::layer::types::defaults;

/// Largest raster edge, in pixels.
pub const MAX_DIM: u32 = 16_384;

/// Compute a conservative raster size for an SVG given the draw transform.
///
/// The returned `(width, height, transform_adjust)` are used as:
///
/// - rasterize the SVG into a pixmap of `(width, height)`
/// - draw the resulting image with `transform_adjust` (not the original transform)
///
/// This avoids blurry upscaling when the SVG is scaled up in the scene.
pub fn svg_raster_params(
    tree: &usvg::Tree,
    transform: Affine,
) -> SceneforgeResult<(u32, u32, Affine)> {
    fn to_px(v: f32) -> SceneforgeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(SceneforgeError::render("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let base_w = to_px(size.width())?;
    let base_h = to_px(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = ((base_w as f64) * sx).ceil().max(1.0) as u32;
    let h = ((base_h as f64) * sy).ceil().max(1.0) as u32;

    if w > MAX_DIM || h > MAX_DIM {
        return Err(SceneforgeError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    // Pixel space maps back to the tree's logical space before the original transform.
    let inv = Affine::scale_non_uniform(1.0 / sx, 1.0 / sy);
    Ok((w, h, transform * inv))
}

/// Rasterize `tree` scaled to `width` x `height`, premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> SceneforgeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SceneforgeError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Lay `text` out in a `width` x `height` box and parse it into a tree.
///
/// With `font` set, that font is registered and preferred over `fontFamily`.
pub fn text_tree(
    text: &TextProps,
    width: f64,
    height: f64,
    font: Option<&[u8]>,
) -> SceneforgeResult<Arc<usvg::Tree>> {
    let (db, embedded) = match font {
        Some(bytes) => fonts::fontdb_with(bytes),
        None => (fonts::system_fontdb(), None),
    };
    let family = embedded
        .or_else(|| text.font_family.clone())
        .unwrap_or_else(|| defaults::FONT_FAMILY.to_string());
    let markup = text_svg_markup(text, width, height, &family)?;
    let tree = usvg::Tree::from_str(&markup, &fonts::svg_options(db))
        .context("parse generated text svg")?;
    Ok(Arc::new(tree))
}

/// SVG document drawing `text` with one `<tspan>` per line.
pub fn text_svg_markup(
    text: &TextProps,
    width: f64,
    height: f64,
    family: &str,
) -> SceneforgeResult<String> {
    let w = width.max(1.0);
    let h = height.max(1.0);
    let font_size = text.font_size.unwrap_or(defaults::FONT_SIZE);
    let line_height = text.line_height.unwrap_or(defaults::LINE_HEIGHT);
    let fill = parse_css_color(text.fill.as_deref().unwrap_or(defaults::FILL))?;
    let (anchor, x) = match text.text_align.as_deref().unwrap_or(defaults::TEXT_ALIGN) {
        "center" => ("middle", w / 2.0),
        "right" => ("end", w),
        _ => ("start", 0.0),
    };
    // charSpacing is in thousandths of an em.
    let spacing = text.char_spacing.unwrap_or(0.0) * font_size / 1000.0;

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let (paint, alpha) = match fill {
        Some(c) => (c.to_hex_rgb(), c.a),
        None => ("none".to_string(), 1.0),
    };
    let _ = write!(
        out,
        r#"<text font-family="{}" font-size="{font_size}" fill="{paint}" fill-opacity="{alpha}" text-anchor="{anchor}" letter-spacing="{spacing}""#,
        escape_xml(family)
    );
    if text.underline.unwrap_or(false) {
        out.push_str(r#" text-decoration="underline""#);
    }
    out.push('>');
    for (i, line) in text.text.as_deref().unwrap_or_default().lines().enumerate() {
        let baseline = font_size * (i as f64 * line_height + 0.9);
        let _ = write!(
            out,
            r#"<tspan x="{x}" y="{baseline}">{}</tspan>"#,
            escape_xml(line)
        );
    }
    out.push_str("</text></svg>");
    Ok(out)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
