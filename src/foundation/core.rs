use crate::foundation::error::{SceneforgeError, SceneforgeResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Shape, Size, Vec2};

/// Artboard dimensions in scene units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width of the artboard.
    pub width: f64,
    /// Height of the artboard.
    pub height: f64,
}

impl FrameSize {
    /// Create a validated frame size with finite, positive dimensions.
    pub fn new(width: f64, height: f64) -> SceneforgeResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Reject zero, negative, or non-finite dimensions.
    pub fn validate(self) -> SceneforgeResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(SceneforgeError::validation("frame size must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SceneforgeError::validation("frame width/height must be > 0"));
        }
        Ok(())
    }

    /// Pixel dimensions, rounding up and clamping to at least one pixel.
    pub fn to_pixels(self) -> (u32, u32) {
        (
            self.width.ceil().max(1.0) as u32,
            self.height.ceil().max(1.0) as u32,
        )
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
