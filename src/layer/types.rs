//! Layer type tags and the renderable / non-renderable split.
//!
//! Every known tag belongs to exactly one of [`RENDERABLE_LAYER_TYPES`] or
//! [`NON_RENDERABLE_LAYER_TYPES`]. Non-renderable tags are structural editor furniture: they are
//! dropped from exported scenes, from history snapshots, and from hit-testing and rasterization.

use std::fmt;
use std::str::FromStr;

/// Discriminator carried in the `type` field of every serialized layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Styled text block.
    StaticText,
    /// Bitmap image.
    StaticImage,
    /// Bitmap painted directly above the background.
    BackgroundImage,
    /// Video with a captured preview frame.
    StaticVideo,
    /// Audio track; never painted.
    StaticAudio,
    /// SVG vector with per-color overrides.
    StaticVector,
    /// Freehand SVG path.
    StaticPath,
    /// Ordered container of child layers.
    Group,
    /// Reserved full-frame fill, always bottommost.
    Background,
    /// AI generation region holding its output as children.
    GenerationFrame,
    /// Artboard border.
    Frame,
    /// Floating UI label.
    Label,
    /// Snapping/alignment guide.
    PositioningHelper,
    /// Any other editor-only helper.
    GenericNonRenderable,
    /// Mask produced by erasing strokes; only ever nested under `eraser`.
    Eraser,
    /// A tag this crate does not know. Imported as an opaque rectangle.
    Unknown(String),
}

/// Tags that are persisted, snapshotted, hit-tested and rasterized.
pub const RENDERABLE_LAYER_TYPES: &[LayerType] = &[
    LayerType::StaticText,
    LayerType::StaticImage,
    LayerType::BackgroundImage,
    LayerType::StaticVideo,
    LayerType::StaticAudio,
    LayerType::StaticVector,
    LayerType::StaticPath,
    LayerType::Group,
    LayerType::Background,
    LayerType::GenerationFrame,
    LayerType::Eraser,
];

/// Structural/UI-only tags.
pub const NON_RENDERABLE_LAYER_TYPES: &[LayerType] = &[
    LayerType::Frame,
    LayerType::Label,
    LayerType::PositioningHelper,
    LayerType::GenericNonRenderable,
];

impl LayerType {
    /// Wire name of this tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::StaticText => "StaticText",
            Self::StaticImage => "StaticImage",
            Self::BackgroundImage => "BackgroundImage",
            Self::StaticVideo => "StaticVideo",
            Self::StaticAudio => "StaticAudio",
            Self::StaticVector => "StaticVector",
            Self::StaticPath => "StaticPath",
            Self::Group => "Group",
            Self::Background => "Background",
            Self::GenerationFrame => "GenerationFrame",
            Self::Frame => "Frame",
            Self::Label => "Label",
            Self::PositioningHelper => "PositioningHelper",
            Self::GenericNonRenderable => "GenericNonRenderable",
            Self::Eraser => "Eraser",
            Self::Unknown(name) => name.as_str(),
        }
    }

    /// `true` for structural helpers that never leave the live canvas.
    pub fn is_non_renderable(&self) -> bool {
        NON_RENDERABLE_LAYER_TYPES.contains(self)
    }

    /// `true` for layers that hold ordered children.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group | Self::GenerationFrame | Self::Eraser)
    }

    /// `true` for layers that never paint pixels even though they are persisted.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::StaticAudio)
    }
}

/// Free-function form of [`LayerType::is_non_renderable`] for filter closures.
pub fn is_non_renderable(layer_type: &LayerType) -> bool {
    layer_type.is_non_renderable()
}

impl FromStr for LayerType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = RENDERABLE_LAYER_TYPES
            .iter()
            .chain(NON_RENDERABLE_LAYER_TYPES)
            .find(|t| t.as_str() == s)
            .cloned();
        Ok(known.unwrap_or_else(|| Self::Unknown(s.to_string())))
    }
}

impl From<&str> for LayerType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for LayerType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for LayerType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Fallback values applied when a serialized layer omits a base attribute.
pub mod defaults {
    /// `scaleX` / `scaleY`.
    pub const SCALE: f64 = 1.0;
    /// `opacity`.
    pub const OPACITY: f64 = 1.0;
    /// `strokeWidth`.
    pub const STROKE_WIDTH: f64 = 0.0;
    /// `strokeLineCap`.
    pub const STROKE_LINE_CAP: &str = "butt";
    /// `strokeLineJoin`.
    pub const STROKE_LINE_JOIN: &str = "miter";
    /// `strokeMiterLimit`.
    pub const STROKE_MITER_LIMIT: f64 = 4.0;
    /// `originX`.
    pub const ORIGIN_X: &str = "left";
    /// `originY`.
    pub const ORIGIN_Y: &str = "top";
    /// Fill used by text and path layers that carry none.
    pub const FILL: &str = "#000000";
    /// Fill of the opaque placeholder that stands in for unknown layer types.
    pub const PLACEHOLDER_FILL: &str = "#d9d9d9";
    /// `fontSize` for text layers.
    pub const FONT_SIZE: f64 = 16.0;
    /// `fontFamily` for text layers.
    pub const FONT_FAMILY: &str = "sans-serif";
    /// `lineHeight` for text layers.
    pub const LINE_HEIGHT: f64 = 1.16;
    /// `textAlign` for text layers.
    pub const TEXT_ALIGN: &str = "left";
}

/// Initial geometry of the artboard frame object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDefaults {
    /// Reserved id of the frame object.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Fill color.
    pub fill: &'static str,
}

/// Default artboard.
pub const DEFAULT_FRAME: FrameDefaults = FrameDefaults {
    id: "frame",
    name: "Initial Frame",
    width: 1200.0,
    height: 1200.0,
    fill: "#ffffff",
};

/// Initial options of the reserved background layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundDefaults {
    /// Reserved id of the background layer.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Fill color.
    pub fill: &'static str,
}

/// Default background.
pub const DEFAULT_BACKGROUND: BackgroundDefaults = BackgroundDefaults {
    id: "background",
    name: "Initial Background",
    fill: "#ffffff",
};

#[cfg(test)]
#[path = "../../tests/unit/layer/types.rs"]
mod tests;
