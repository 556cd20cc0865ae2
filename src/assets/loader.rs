//! Resource resolution for layer sources.
//!
//! Layers reference bitmaps, SVGs, fonts and videos by URL. A [`ResourceLoader`] turns such a URL
//! into bytes (or a captured frame). Loads are the only suspension points during import, so the
//! trait is async; everything after the bytes arrive is synchronous decoding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine as _;

use crate::assets::media::{self, VideoFrame};
use crate::foundation::error::{SceneforgeError, SceneforgeResult};

/// Fetches layer resources by URL.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Raw bytes behind `src`.
    async fn load_bytes(&self, src: &str) -> SceneforgeResult<Vec<u8>>;

    /// Frame of the video at `src`, seeked to `at_secs`.
    async fn load_video_frame(&self, src: &str, at_secs: f64) -> SceneforgeResult<VideoFrame>;
}

/// Shared, type-erased loader.
pub type SharedLoader = Arc<dyn ResourceLoader>;

/// Loader for `data:` URLs, local files and (with the `http` feature) remote URLs.
///
/// Relative paths resolve against `root` and may not escape it.
#[derive(Clone, Debug)]
pub struct FsResourceLoader {
    root: PathBuf,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

enum Source<'a> {
    Data(&'a str),
    Remote(&'a str),
    File(PathBuf),
}

impl FsResourceLoader {
    /// Loader resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            #[cfg(feature = "http")]
            client: reqwest::Client::new(),
        }
    }

    /// Directory relative paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn classify<'a>(&self, src: &'a str) -> SceneforgeResult<Source<'a>> {
        let trimmed = src.trim();
        if trimmed.starts_with("data:") {
            return Ok(Source::Data(trimmed));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Source::Remote(trimmed));
        }
        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(Source::File(PathBuf::from(path)));
        }
        let rel = normalize_rel_path(trimmed)?;
        Ok(Source::File(self.root.join(Path::new(&rel))))
    }

    #[cfg(feature = "http")]
    async fn fetch_remote(&self, url: &str) -> SceneforgeResult<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SceneforgeError::resource(format!("fetch '{url}': {e}")))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SceneforgeError::resource(format!("read body of '{url}': {e}")))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_remote(&self, url: &str) -> SceneforgeResult<Vec<u8>> {
        Err(SceneforgeError::resource(format!(
            "remote resource '{url}' requires the 'http' feature"
        )))
    }
}

#[async_trait]
impl ResourceLoader for FsResourceLoader {
    #[tracing::instrument(skip(self), fields(src = %truncate_for_log(src)))]
    async fn load_bytes(&self, src: &str) -> SceneforgeResult<Vec<u8>> {
        match self.classify(src)? {
            Source::Data(url) => decode_data_url(url),
            Source::Remote(url) => self.fetch_remote(url).await,
            Source::File(path) => tokio::fs::read(&path)
                .await
                .with_context(|| format!("read resource bytes from '{}'", path.display()))
                .map_err(|e| SceneforgeError::resource(format!("{e:#}"))),
        }
    }

    async fn load_video_frame(&self, src: &str, at_secs: f64) -> SceneforgeResult<VideoFrame> {
        let input = match self.classify(src)? {
            Source::Data(_) => {
                return Err(SceneforgeError::resource(
                    "video sources cannot be data URLs",
                ));
            }
            Source::Remote(url) => url.to_string(),
            Source::File(path) => path.to_string_lossy().into_owned(),
        };
        tokio::task::spawn_blocking(move || {
            let info = media::probe_video(&input)?;
            media::capture_frame(&info, at_secs)
        })
        .await
        .map_err(|e| SceneforgeError::resource(format!("video capture task failed: {e}")))?
    }
}

/// Decode a `data:` URL payload (base64 or percent-encoded).
pub fn decode_data_url(url: &str) -> SceneforgeResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| SceneforgeError::resource("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SceneforgeError::resource("invalid data URL: missing ','"))?;
    if header.ends_with(";base64") {
        return base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| SceneforgeError::resource(format!("invalid base64 in data URL: {e}")));
    }
    percent_decode(payload)
}

fn percent_decode(s: &str) -> SceneforgeResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| SceneforgeError::resource("invalid percent escape in data URL"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Normalize and validate a root-relative resource path.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths or parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> SceneforgeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SceneforgeError::validation("resource paths must be relative"));
    }
    if s.is_empty() {
        return Err(SceneforgeError::validation("resource path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SceneforgeError::validation(
                "resource paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SceneforgeError::validation(
            "resource path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

pub(crate) fn truncate_for_log(src: &str) -> &str {
    match src.char_indices().nth(64) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
