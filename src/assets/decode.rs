use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::SceneforgeResult;

/// Bitmap decoded to premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying in place.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> Self {
        premultiply_rgba8_in_place(&mut rgba);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        }
    }
}

/// Parsed SVG document.
#[derive(Clone, Debug)]
pub struct VectorAsset {
    /// Parsed tree.
    pub tree: Arc<usvg::Tree>,
    /// Intrinsic width from the SVG root.
    pub width: f64,
    /// Intrinsic height from the SVG root.
    pub height: f64,
}

/// Decode PNG, JPEG or any other format `image` supports into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SceneforgeResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::from_straight_rgba8(width, height, rgba.into_raw()))
}

/// Parse SVG bytes against the shared font database.
pub fn parse_svg(bytes: &[u8]) -> SceneforgeResult<VectorAsset> {
    let opts = crate::assets::fonts::svg_options(crate::assets::fonts::system_fontdb());
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    let size = tree.size();
    Ok(VectorAsset {
        width: f64::from(size.width()),
        height: f64::from(size.height()),
        tree: Arc::new(tree),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
