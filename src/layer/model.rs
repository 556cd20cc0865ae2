//! Portable layer representation.
//!
//! A [`Layer`] is the shape a visual element takes in scene JSON, in history snapshots and in
//! component fragments. Every attribute is optional on input; the importer fills documented
//! defaults and the exporter always writes the full attribute set back.
//!
//! The JSON form is flat: shared base attributes, the `type` tag and the type-specific attributes
//! all live in one object. In memory the split is explicit: [`LayerBase`] for the shared part and
//! [`LayerKind`] for the per-type part.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layer::types::{LayerType, defaults};

/// Free-form string-keyed metadata bag.
pub type Metadata = Map<String, Value>;

/// Drop shadow attached to a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// Blur radius.
    #[serde(default)]
    pub blur: f64,
    /// CSS color.
    #[serde(default = "default_shadow_color")]
    pub color: String,
    /// Horizontal offset.
    #[serde(default)]
    pub offset_x: f64,
    /// Vertical offset.
    #[serde(default)]
    pub offset_y: f64,
    /// Whether the shadow is also cast by the stroke.
    #[serde(default)]
    pub affect_stroke: bool,
}

fn default_shadow_color() -> String {
    "#000000".to_string()
}

/// Attributes shared by every layer type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerBase {
    /// Stable unique id; generated on import when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name; falls back to the type tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position of the origin anchor, x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    /// Position of the origin anchor, y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Unscaled width. Absent means "take it from the loaded resource".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Unscaled height. Absent means "take it from the loaded resource".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Horizontal scale factor, default 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    /// Vertical scale factor, default 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// Rotation in degrees, clockwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Mirror horizontally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    /// Mirror vertically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    /// Horizontal skew in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_x: Option<f64>,
    /// Vertical skew in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_y: Option<f64>,
    /// `left`, `center` or `right`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<String>,
    /// `top`, `center` or `bottom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<String>,
    /// Opacity in `0..=1`, default 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Stroke color. Never defaulted: absent means no stroke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width, default 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Dash pattern lengths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dash_array: Option<Vec<f64>>,
    /// `butt`, `round` or `square`; default `butt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_line_cap: Option<String>,
    /// `miter`, `round` or `bevel`; default `miter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_line_join: Option<String>,
    /// Miter limit, default 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_miter_limit: Option<f64>,
    /// Keep stroke width constant under scaling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_uniform: Option<bool>,
    /// Drop shadow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    /// Clip mask, expressed as another layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<Box<Layer>>,
    /// Eraser mask produced by erasing strokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eraser: Option<Box<Layer>>,
    /// Cached raster thumbnail (usually a data URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// JSON keys owned by [`LayerBase`] (plus the `type` tag).
pub(crate) const BASE_FIELDS: &[&str] = &[
    "type",
    "id",
    "name",
    "left",
    "top",
    "width",
    "height",
    "scaleX",
    "scaleY",
    "angle",
    "flipX",
    "flipY",
    "skewX",
    "skewY",
    "originX",
    "originY",
    "opacity",
    "stroke",
    "strokeWidth",
    "strokeDashArray",
    "strokeLineCap",
    "strokeLineJoin",
    "strokeMiterLimit",
    "strokeUniform",
    "shadow",
    "clipPath",
    "eraser",
    "preview",
    "metadata",
];

impl LayerBase {
    /// `left`, or 0.
    pub fn left(&self) -> f64 {
        self.left.unwrap_or(0.0)
    }

    /// `top`, or 0.
    pub fn top(&self) -> f64 {
        self.top.unwrap_or(0.0)
    }

    /// `scale_x`, or 1.
    pub fn scale_x(&self) -> f64 {
        self.scale_x.unwrap_or(defaults::SCALE)
    }

    /// `scale_y`, or 1.
    pub fn scale_y(&self) -> f64 {
        self.scale_y.unwrap_or(defaults::SCALE)
    }

    /// `angle`, or 0.
    pub fn angle(&self) -> f64 {
        self.angle.unwrap_or(0.0)
    }

    /// `opacity`, or 1.
    pub fn opacity(&self) -> f64 {
        self.opacity.unwrap_or(defaults::OPACITY)
    }

    /// `stroke_width`, or 0.
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(defaults::STROKE_WIDTH)
    }

    /// Metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

/// Attributes of [`LayerType::StaticText`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    /// Content; lines separated by `\n`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Where to fetch the font file from.
    #[serde(rename = "fontURL", skip_serializing_if = "Option::is_none")]
    pub font_url: Option<String>,
    /// Extra letter spacing in thousandths of an em.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_spacing: Option<f64>,
    /// Line height as a multiple of the font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// `left`, `center`, `right` or `justify`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Underline the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Attributes of [`LayerType::StaticImage`] and [`LayerType::BackgroundImage`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProps {
    /// Image URL or path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Horizontal crop offset in source pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<f64>,
    /// Vertical crop offset in source pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<f64>,
}

/// Attributes of [`LayerType::StaticVideo`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoProps {
    /// Video URL or path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Attributes of [`LayerType::StaticAudio`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioProps {
    /// Audio URL or path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// Attributes of [`LayerType::StaticVector`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorProps {
    /// SVG URL or path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Source color -> replacement color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<BTreeMap<String, String>>,
}

/// Attributes of [`LayerType::StaticPath`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathProps {
    /// SVG path data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Attributes of container layers ([`LayerType::Group`], [`LayerType::Eraser`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupProps {
    /// Children in z-order, bottom first.
    pub objects: Vec<Layer>,
}

/// Attributes of [`LayerType::GenerationFrame`].
///
/// Generation parameters live in the layer metadata; see
/// [`GenerationParams`](crate::layer::generation::GenerationParams).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationFrameProps {
    /// Generated content, bottom first.
    pub objects: Vec<Layer>,
    /// Fill drawn behind the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Attributes of fill-only layers ([`LayerType::Background`], [`LayerType::Frame`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillProps {
    /// Fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Per-type part of a layer.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    /// Text block.
    StaticText(TextProps),
    /// Bitmap.
    StaticImage(ImageProps),
    /// Bitmap pinned above the background.
    BackgroundImage(ImageProps),
    /// Video shown at its first frame.
    StaticVideo(VideoProps),
    /// Audio clip; never drawn.
    StaticAudio(AudioProps),
    /// SVG graphic.
    StaticVector(VectorProps),
    /// SVG path.
    StaticPath(PathProps),
    /// Container with local child coordinates.
    Group(GroupProps),
    /// The single reserved background fill.
    Background(FillProps),
    /// Region holding generation parameters and their output.
    GenerationFrame(GenerationFrameProps),
    /// Erasing strokes; never drawn.
    Eraser(GroupProps),
    /// Artboard border.
    Frame(FillProps),
    /// Label, positioning helper or other UI-only helper; attributes kept verbatim.
    Structural {
        /// Which helper this is.
        layer_type: LayerType,
        /// Type-specific attributes.
        props: Metadata,
    },
    /// Unrecognized tag; attributes kept verbatim so the layer survives a round-trip.
    Unknown {
        /// The tag as written.
        type_name: String,
        /// Type-specific attributes.
        props: Metadata,
    },
}

impl LayerKind {
    /// Type tag of this variant.
    pub fn layer_type(&self) -> LayerType {
        match self {
            Self::StaticText(_) => LayerType::StaticText,
            Self::StaticImage(_) => LayerType::StaticImage,
            Self::BackgroundImage(_) => LayerType::BackgroundImage,
            Self::StaticVideo(_) => LayerType::StaticVideo,
            Self::StaticAudio(_) => LayerType::StaticAudio,
            Self::StaticVector(_) => LayerType::StaticVector,
            Self::StaticPath(_) => LayerType::StaticPath,
            Self::Group(_) => LayerType::Group,
            Self::Background(_) => LayerType::Background,
            Self::GenerationFrame(_) => LayerType::GenerationFrame,
            Self::Eraser(_) => LayerType::Eraser,
            Self::Frame(_) => LayerType::Frame,
            Self::Structural { layer_type, .. } => layer_type.clone(),
            Self::Unknown { type_name, .. } => LayerType::Unknown(type_name.clone()),
        }
    }
}

/// One visual element of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Shared attributes.
    pub base: LayerBase,
    /// Type tag plus type-specific attributes.
    pub kind: LayerKind,
}

impl Layer {
    /// Layer with empty base attributes.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            base: LayerBase::default(),
            kind,
        }
    }

    /// Text layer.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(LayerKind::StaticText(TextProps {
            text: Some(text.into()),
            ..TextProps::default()
        }))
    }

    /// Image layer.
    pub fn image(src: impl Into<String>) -> Self {
        Self::new(LayerKind::StaticImage(ImageProps {
            src: Some(src.into()),
            ..ImageProps::default()
        }))
    }

    /// Vector layer.
    pub fn vector(src: impl Into<String>) -> Self {
        Self::new(LayerKind::StaticVector(VectorProps {
            src: Some(src.into()),
            color_map: None,
        }))
    }

    /// Path layer from SVG path data.
    pub fn path(d: impl Into<String>, fill: impl Into<String>) -> Self {
        Self::new(LayerKind::StaticPath(PathProps {
            path: Some(d.into()),
            fill: Some(fill.into()),
        }))
    }

    /// Group of `objects`.
    pub fn group(objects: Vec<Layer>) -> Self {
        Self::new(LayerKind::Group(GroupProps { objects }))
    }

    /// Generation frame holding `objects`.
    pub fn generation_frame(objects: Vec<Layer>) -> Self {
        Self::new(LayerKind::GenerationFrame(GenerationFrameProps {
            objects,
            fill: None,
        }))
    }

    /// Background fill.
    pub fn background(fill: impl Into<String>) -> Self {
        Self::new(LayerKind::Background(FillProps {
            fill: Some(fill.into()),
        }))
    }

    /// UI-only helper of the given structural type.
    pub fn structural(layer_type: LayerType) -> Self {
        Self::new(LayerKind::Structural {
            layer_type,
            props: Metadata::new(),
        })
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.base.id = Some(id.into());
        self
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base.name = Some(name.into());
        self
    }

    /// Set `left`/`top`.
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.base.left = Some(left);
        self.base.top = Some(top);
        self
    }

    /// Set `width`/`height`.
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.base.width = Some(width);
        self.base.height = Some(height);
        self
    }

    /// Insert a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.base
            .metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value);
        self
    }

    /// Type tag.
    pub fn layer_type(&self) -> LayerType {
        self.kind.layer_type()
    }

    /// Id, if one is set.
    pub fn id(&self) -> Option<&str> {
        self.base.id.as_deref()
    }

    /// `false` for structural helpers.
    pub fn is_renderable(&self) -> bool {
        !self.layer_type().is_non_renderable()
    }

    /// Children of container layers.
    pub fn children(&self) -> Option<&[Layer]> {
        match &self.kind {
            LayerKind::Group(g) | LayerKind::Eraser(g) => Some(&g.objects),
            LayerKind::GenerationFrame(g) => Some(&g.objects),
            _ => None,
        }
    }

    /// Mutable children of container layers.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Layer>> {
        match &mut self.kind {
            LayerKind::Group(g) | LayerKind::Eraser(g) => Some(&mut g.objects),
            LayerKind::GenerationFrame(g) => Some(&mut g.objects),
            _ => None,
        }
    }

    /// Visit this layer and every nested child, clip path and eraser, depth first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Layer)) {
        f(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(f);
            }
        }
        if let Some(clip) = &self.base.clip_path {
            clip.walk(f);
        }
        if let Some(eraser) = &self.base.eraser {
            eraser.walk(f);
        }
    }

    /// Flat JSON form.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut out = Map::new();
        out.insert(
            "type".to_string(),
            Value::String(self.layer_type().as_str().to_string()),
        );
        out.extend(object_map(&self.base)?);
        let kind = match &self.kind {
            LayerKind::StaticText(p) => object_map(p)?,
            LayerKind::StaticImage(p) | LayerKind::BackgroundImage(p) => object_map(p)?,
            LayerKind::StaticVideo(p) => object_map(p)?,
            LayerKind::StaticAudio(p) => object_map(p)?,
            LayerKind::StaticVector(p) => object_map(p)?,
            LayerKind::StaticPath(p) => object_map(p)?,
            LayerKind::Group(p) | LayerKind::Eraser(p) => object_map(p)?,
            LayerKind::GenerationFrame(p) => object_map(p)?,
            LayerKind::Background(p) | LayerKind::Frame(p) => object_map(p)?,
            LayerKind::Structural { props, .. } | LayerKind::Unknown { props, .. } => {
                props.clone()
            }
        };
        out.extend(kind);
        Ok(Value::Object(out))
    }

    /// Parse the flat JSON form. A missing or unrecognized `type` yields [`LayerKind::Unknown`].
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let Value::Object(map) = value else {
            return Err(serde_json::Error::custom("layer must be a JSON object"));
        };
        let type_name = map
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let base: LayerBase = serde_json::from_value(Value::Object(map.clone()))?;
        let layer_type = LayerType::from(type_name.as_str());
        let obj = Value::Object(map);

        let kind = match layer_type {
            LayerType::StaticText => LayerKind::StaticText(serde_json::from_value(obj)?),
            LayerType::StaticImage => LayerKind::StaticImage(serde_json::from_value(obj)?),
            LayerType::BackgroundImage => LayerKind::BackgroundImage(serde_json::from_value(obj)?),
            LayerType::StaticVideo => LayerKind::StaticVideo(serde_json::from_value(obj)?),
            LayerType::StaticAudio => LayerKind::StaticAudio(serde_json::from_value(obj)?),
            LayerType::StaticVector => LayerKind::StaticVector(serde_json::from_value(obj)?),
            LayerType::StaticPath => LayerKind::StaticPath(serde_json::from_value(obj)?),
            LayerType::Group => LayerKind::Group(serde_json::from_value(obj)?),
            LayerType::Background => LayerKind::Background(serde_json::from_value(obj)?),
            LayerType::GenerationFrame => LayerKind::GenerationFrame(serde_json::from_value(obj)?),
            LayerType::Eraser => LayerKind::Eraser(serde_json::from_value(obj)?),
            LayerType::Frame => LayerKind::Frame(serde_json::from_value(obj)?),
            LayerType::Label | LayerType::PositioningHelper | LayerType::GenericNonRenderable => {
                LayerKind::Structural {
                    layer_type,
                    props: strip_base_fields(obj),
                }
            }
            LayerType::Unknown(type_name) => LayerKind::Unknown {
                type_name,
                props: strip_base_fields(obj),
            },
        };

        Ok(Self { base, kind })
    }
}

fn object_map<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(m) => Ok(m),
        _ => Ok(Map::new()),
    }
}

fn strip_base_fields(value: Value) -> Metadata {
    let Value::Object(mut map) = value else {
        return Metadata::new();
    };
    for key in BASE_FIELDS {
        map.remove(*key);
    }
    map
}

impl Serialize for Layer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Layer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
