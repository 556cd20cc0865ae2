//! Sceneforge is the document model of a layered design editor.
//!
//! A design is a [`Scene`]: an artboard size plus a z-ordered list of typed [`Layer`]s (text,
//! bitmaps, vectors, paths, video, audio, groups, generation frames). Around that model the crate
//! provides:
//!
//! - **Import**: layers become live [`CanvasObject`]s with defaults filled in and external
//!   resources (bitmaps, SVGs, fonts, video frames) fetched through a [`ResourceLoader`].
//! - **Export**: live objects project back to frame-relative plain data.
//! - **History**: whole-canvas snapshots with undo/redo ([`History`]).
//! - **Rendering**: headless rasterization of scenes and single layers ([`Renderer`]).
//!
//! [`Editor`] wires one canvas, its history, scene I/O and a renderer together.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Structural layers are never persisted**: labels, guides, the frame and its clip exist only
//!   on the live canvas.
//! - **Premultiplied RGBA8**: the raster backend outputs premultiplied pixels.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod canvas;
mod config;
mod editor;
mod export;
mod foundation;
mod history;
mod import;
mod layer;
mod render;
mod scene;

pub use crate::assets::color::{Color, parse_css_color};
pub use crate::assets::decode::{DecodedImage, VectorAsset, decode_image, parse_svg};
pub use crate::assets::fonts::{FONT_DIR_ENV, load_fonts_from_dir, system_fontdb};
pub use crate::assets::loader::{
    FsResourceLoader, ResourceLoader, SharedLoader, decode_data_url, normalize_rel_path,
};
pub use crate::assets::media::{VideoFrame, VideoInfo, capture_frame, probe_video};
pub use crate::assets::vector::{apply_color_map, load_vector};
pub use crate::canvas::frame::{ABSOLUTE_CLIP_KEY, FrameController, is_absolute_clip};
pub use crate::canvas::object::{CanvasObject, Resource, layer_transform};
pub use crate::canvas::store::{Canvas, CanvasHandle};
pub use crate::config::{EditorConfig, FrameConfig, HistoryConfig, ViewportConfig};
pub use crate::editor::Editor;
pub use crate::export::exporter::{export_layer, export_layers};
pub use crate::foundation::core::{
    Affine, BezPath, FrameSize, Point, Rect, Rgba8Premul, Size, Vec2,
};
pub use crate::foundation::error::{SceneforgeError, SceneforgeResult};
pub use crate::foundation::ids::{id_or_new, new_id};
pub use crate::history::engine::History;
pub use crate::history::events::{EntryKind, HistoryEntry, HistoryEvent, HistoryStatus};
pub use crate::history::guard::HistoryGuard;
pub use crate::import::base::{ImportContext, base_options, estimate_text_size};
pub use crate::import::importer::ObjectImporter;
pub use crate::import::render_importer::{RenderImporter, SkippedLayer};
pub use crate::layer::generation::{
    GenerationParams, InitImage, TRANSIENT_METADATA_KEYS, strip_transient,
};
pub use crate::layer::model::{
    AudioProps, FillProps, GenerationFrameProps, GroupProps, ImageProps, Layer, LayerBase,
    LayerKind, Metadata, PathProps, Shadow, TextProps, VectorProps, VideoProps,
};
pub use crate::layer::types::{
    DEFAULT_BACKGROUND, DEFAULT_FRAME, LayerType, NON_RENDERABLE_LAYER_TYPES,
    RENDERABLE_LAYER_TYPES, defaults, is_non_renderable,
};
pub use crate::render::backend::{DrawCommand, FrameRGBA, RasterBackend};
pub use crate::render::cpu::CpuRasterBackend;
pub use crate::render::renderer::{RenderLayerParams, Renderer, compile_objects};
pub use crate::scene::component::{Component, ComponentCategory, build_component};
pub use crate::scene::controller::{ImportReport, LayerFailure, SCENE_ID_EXTRA, SceneController};
pub use crate::scene::model::{ANIMATED_KEY, Scene, contains_animation};
