//! Persisted scene document.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::core::FrameSize;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::layer::model::{Layer, Metadata};
use crate::layer::types::LayerType;

/// Metadata key flagging scenes that contain time-based media.
pub const ANIMATED_KEY: &str = "animated";

/// A named collection of frame-relative layers plus the artboard size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene id; generated on export when empty.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Artboard size.
    pub frame: FrameSize,
    /// Bottom first. Structural layer types never appear here.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Free-form metadata; `animated` is recomputed on export.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Scene {
    /// Empty scene with a `frame`-sized artboard.
    pub fn new(frame: FrameSize) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            frame,
            layers: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Parse a scene from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneforgeResult<Self> {
        let scene: Self = serde_json::from_reader(r)
            .map_err(|e| SceneforgeError::serde(format!("parse scene JSON: {e}")))?;
        Ok(scene)
    }

    /// Read a scene from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SceneforgeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneforgeError::validation(format!("open scene '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write pretty-printed JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> SceneforgeResult<()> {
        serde_json::to_writer_pretty(w, self)?;
        Ok(())
    }

    /// Write pretty-printed JSON to a file.
    pub fn to_path(&self, path: impl AsRef<Path>) -> SceneforgeResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            SceneforgeError::validation(format!("create scene '{}': {e}", path.display()))
        })?;
        self.to_writer(BufWriter::new(f))
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> SceneforgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `metadata.animated`, false when absent.
    pub fn is_animated(&self) -> bool {
        self.metadata.get(ANIMATED_KEY).and_then(Value::as_bool) == Some(true)
    }

    /// First top-level or nested layer with `id`.
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        let mut found = None;
        for layer in &self.layers {
            layer.walk(&mut |l| {
                if found.is_none() && l.id() == Some(id) {
                    found = Some(l);
                }
            });
        }
        found
    }

    /// Check invariants serde cannot: frame size, unique ids, positive sizes, no structural layers
    /// at top level.
    pub fn validate(&self) -> SceneforgeResult<()> {
        self.frame.validate()?;
        let mut seen = HashSet::new();
        let mut problem: Option<String> = None;
        for layer in &self.layers {
            if !layer.is_renderable() {
                return Err(SceneforgeError::validation(format!(
                    "structural layer type '{}' must not be persisted",
                    layer.layer_type()
                )));
            }
            layer.walk(&mut |l| {
                if problem.is_some() {
                    return;
                }
                if let Some(id) = l.id()
                    && !seen.insert(id.to_string())
                {
                    problem = Some(format!("duplicate layer id '{id}'"));
                    return;
                }
                for (dim, v) in [("width", l.base.width), ("height", l.base.height)] {
                    if let Some(v) = v
                        && !(v.is_finite() && v > 0.0)
                    {
                        problem = Some(format!(
                            "layer '{}' has non-positive {dim} {v}",
                            l.id().unwrap_or_default()
                        ));
                        return;
                    }
                }
            });
        }
        match problem {
            Some(msg) => Err(SceneforgeError::validation(msg)),
            None => Ok(()),
        }
    }
}

/// Whether any layer in the tree is time-based media.
pub fn contains_animation(layers: &[Layer]) -> bool {
    let mut animated = false;
    for layer in layers {
        layer.walk(&mut |l| {
            animated |= l.layer_type() == LayerType::StaticVideo;
        });
    }
    animated
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
