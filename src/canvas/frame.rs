//! The artboard.
//!
//! The frame is a structural layer: it positions the exported coordinate system and optionally
//! clips top-level objects, but it is never persisted and never part of history.

use serde_json::Value;

use crate::config::FrameConfig;
use crate::foundation::core::{FrameSize, Rect, Vec2};
use crate::layer::model::{FillProps, Layer, LayerKind};
use crate::layer::types::DEFAULT_FRAME;

/// Metadata flag marking a clip path expressed in canvas space instead of object space.
pub const ABSOLUTE_CLIP_KEY: &str = "absolutePositioned";

/// Placement and fill of the artboard.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameController {
    left: f64,
    top: f64,
    size: FrameSize,
    fill: String,
}

impl Default for FrameController {
    fn default() -> Self {
        Self::from_config(&FrameConfig::default())
    }
}

impl FrameController {
    /// Frame placed and filled as configured.
    pub fn from_config(cfg: &FrameConfig) -> Self {
        Self {
            left: cfg.left,
            top: cfg.top,
            size: cfg.size(),
            fill: cfg.fill.clone(),
        }
    }

    /// Frame at the canvas origin with a transparent fill.
    pub fn offscreen(size: FrameSize) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            size,
            fill: "transparent".to_string(),
        }
    }

    /// Artboard size.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Fill color of the frame object.
    pub fn fill(&self) -> &str {
        &self.fill
    }

    /// Canvas-space position of the frame's top-left corner.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Canvas-space frame bounds.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.size.width,
            self.top + self.size.height,
        )
    }

    /// Change dimensions, keeping the top-left corner.
    pub fn resize(&mut self, size: FrameSize) {
        self.size = size;
    }

    /// Canvas-space clip matching the frame rectangle.
    pub fn clip_layer(&self) -> Layer {
        let FrameSize { width, height } = self.size;
        Layer::path(format!("M 0 0 H {width} V {height} H 0 Z"), "#000000")
            .with_id("frame-clip")
            .at(self.left, self.top)
            .sized(width, height)
            .with_meta(ABSOLUTE_CLIP_KEY, Value::Bool(true))
    }

    /// Structural layer describing the frame.
    pub fn to_layer(&self) -> Layer {
        Layer::new(LayerKind::Frame(FillProps {
            fill: Some(self.fill.clone()),
        }))
        .with_id(DEFAULT_FRAME.id)
        .with_name(DEFAULT_FRAME.name)
        .at(self.left, self.top)
        .sized(self.size.width, self.size.height)
    }
}

/// Whether `layer` is a canvas-space clip such as the one from [`FrameController::clip_layer`].
pub fn is_absolute_clip(layer: &Layer) -> bool {
    layer.base.meta(ABSOLUTE_CLIP_KEY) == Some(&Value::Bool(true))
}
