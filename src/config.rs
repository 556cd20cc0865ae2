//! Editor-wide settings.
//!
//! Every field has a default so a partial JSON document (or none at all) yields a usable
//! configuration. Values here are policy, not scene data: they are never written into exported
//! scenes.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::core::FrameSize;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};
use crate::layer::model::Shadow;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial artboard placement and fill.
    pub frame: FrameConfig,
    /// Clip every top-level object to the frame rectangle on scene import.
    pub clip_to_frame: bool,
    /// Shadow forced onto Background layers; the stored shadow is ignored on import.
    pub background_shadow: Option<Shadow>,
    /// Undo/redo timing.
    pub history: HistoryConfig,
    /// Viewport used for fit-to-frame zoom.
    pub viewport: ViewportConfig,
    /// Directory relative resource URLs resolve against.
    pub assets_root: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            clip_to_frame: true,
            background_shadow: Some(Shadow {
                blur: 4.0,
                color: "#afafaf".to_string(),
                offset_x: 1.0,
                offset_y: 1.0,
                affect_stroke: false,
            }),
            history: HistoryConfig::default(),
            viewport: ViewportConfig::default(),
            assets_root: PathBuf::from("."),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneforgeResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SceneforgeError::validation(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SceneforgeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneforgeError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> SceneforgeResult<()> {
        self.frame.size().validate()?;
        if !(self.viewport.fit_ratio > 0.0 && self.viewport.fit_ratio <= 1.0) {
            return Err(SceneforgeError::validation(
                "viewport fit_ratio must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Initial frame geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frame width.
    pub width: f64,
    /// Frame height.
    pub height: f64,
    /// Canvas-absolute left edge of the frame.
    pub left: f64,
    /// Canvas-absolute top edge of the frame.
    pub top: f64,
    /// Frame fill color.
    pub fill: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 1200.0,
            left: 0.0,
            top: 0.0,
            fill: "#ffffff".to_string(),
        }
    }
}

impl FrameConfig {
    /// Frame dimensions.
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Timing knobs for the history engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo/redo calls closer together than this collapse into one.
    pub undo_throttle_ms: u64,
    /// Wait after discarding the selection before tearing the canvas down.
    pub deselect_grace_ms: u64,
    /// Wait after a restore before snapshots are accepted again.
    pub settle_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_throttle_ms: 100,
            deselect_grace_ms: 50,
            settle_ms: 50,
        }
    }
}

impl HistoryConfig {
    pub(crate) fn undo_throttle(&self) -> Duration {
        Duration::from_millis(self.undo_throttle_ms)
    }

    pub(crate) fn deselect_grace(&self) -> Duration {
        Duration::from_millis(self.deselect_grace_ms)
    }

    pub(crate) fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// On-screen viewport the frame is fitted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in screen pixels.
    pub width: f64,
    /// Viewport height in screen pixels.
    pub height: f64,
    /// Fraction of the viewport the fitted frame may occupy.
    pub fit_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            fit_ratio: 0.9,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
