//! Backend-agnostic draw commands and the raster output type.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::SceneforgeResult;

/// One draw call in device space. Commands are replayed in order, bottom first.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    /// Fill `path`.
    FillPath {
        /// Outline in local space.
        path: BezPath,
        /// Local space to device space.
        transform: Affine,
        /// Straight-alpha RGBA8.
        color: [u8; 4],
        /// Group opacity applied on top of `color`.
        opacity: f32,
    },
    /// Stroke `path`.
    StrokePath {
        /// Outline in local space.
        path: BezPath,
        /// Local space to device space.
        transform: Affine,
        /// Straight-alpha RGBA8.
        color: [u8; 4],
        /// Stroke width in local units.
        width: f64,
        /// Group opacity applied on top of `color`.
        opacity: f32,
    },
    /// Bitmap drawn into `0..width`, `0..height` of its local space.
    Image {
        /// Premultiplied pixels.
        image: DecodedImage,
        /// Local space to device space.
        transform: Affine,
        /// Group opacity.
        opacity: f32,
    },
    /// SVG drawn into `0..size` of its local space.
    Svg {
        /// Parsed document.
        tree: Arc<usvg::Tree>,
        /// Local space to device space.
        transform: Affine,
        /// Group opacity.
        opacity: f32,
    },
    /// Restrict following commands to `path` until the matching [`DrawCommand::PopClip`].
    PushClip {
        /// Clip outline in local space.
        path: BezPath,
        /// Local space to device space.
        transform: Affine,
    },
    /// End the innermost clip.
    PopClip,
}

/// A device that turns draw commands into pixels.
pub trait RasterBackend: Send {
    /// Replay `commands` onto a transparent `width` x `height` frame.
    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        commands: &[DrawCommand],
    ) -> SceneforgeResult<FrameRGBA>;
}

/// A rendered frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        Some(if self.premultiplied { unpremultiply(px) } else { px })
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let s = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&s);
        }
        out
    }

    /// Encode as PNG with straight alpha.
    pub fn to_png(&self) -> SceneforgeResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .context("frame buffer does not match its dimensions")?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    /// `data:image/png;base64,...`
    pub fn to_data_url(&self) -> SceneforgeResult<String> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return [r, g, b, a];
    }
    let a16 = u16::from(a);
    let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
    [un(r), un(g), un(b), a]
}
