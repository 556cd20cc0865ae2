//! Generation-frame parameters.
//!
//! A generation frame keeps its AI-generation settings inside the layer `metadata` map so the
//! persisted shape stays a plain layer. [`GenerationParams`] is the typed view over that map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::error::SceneforgeResult;
use crate::layer::model::{Layer, LayerKind, Metadata};

/// Metadata keys that only exist on a live generation frame and are never persisted.
pub const TRANSIENT_METADATA_KEYS: &[&str] = &["loadingBar", "error"];

/// Init-image settings for image-to-image generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitImage {
    /// Noise amount added to the init image.
    pub noise: f64,
    /// Keep the init image fixed across runs.
    pub fixed: bool,
    /// How strongly the prompt overrides the init image.
    pub prompt_strength: f64,
}

impl Default for InitImage {
    fn default() -> Self {
        Self {
            noise: 0.0,
            fixed: false,
            prompt_strength: 0.8,
        }
    }
}

/// Typed view over a generation frame's metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationParams {
    /// Text prompt.
    pub prompt: String,
    /// Sampling steps per run.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub guidance: f64,
    /// Model identifier.
    pub model_key: Option<String>,
    /// Steps already spent on the current content.
    pub accumulated_steps: u32,
    /// Init-image settings.
    pub init_image: InitImage,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            steps: 30,
            guidance: 7.5,
            model_key: None,
            accumulated_steps: 0,
            init_image: InitImage::default(),
        }
    }
}

impl GenerationParams {
    /// Read parameters from a layer's metadata. Missing keys take defaults; extra keys are ignored.
    pub fn from_metadata(metadata: Option<&Metadata>) -> SceneforgeResult<Self> {
        let Some(metadata) = metadata else {
            return Ok(Self::default());
        };
        Ok(serde_json::from_value(Value::Object(metadata.clone()))?)
    }

    /// Read parameters from a generation frame layer, `None` for any other type.
    pub fn from_layer(layer: &Layer) -> SceneforgeResult<Option<Self>> {
        match layer.kind {
            LayerKind::GenerationFrame(_) => {
                Self::from_metadata(layer.base.metadata.as_ref()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Merge these parameters into `metadata`, keeping unrelated keys.
    pub fn write_into(&self, metadata: &mut Metadata) -> SceneforgeResult<()> {
        if let Value::Object(map) = serde_json::to_value(self)? {
            metadata.extend(map);
        }
        Ok(())
    }
}

/// Drop live-only keys from a metadata map.
pub fn strip_transient(metadata: &mut Metadata) {
    for key in TRANSIENT_METADATA_KEYS {
        metadata.remove(*key);
    }
}
