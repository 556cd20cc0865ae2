use crate::assets::decode::DecodedImage;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};

/// Probed properties of a video source.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Path or URL handed to ffmpeg.
    pub input: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Duration in seconds; `0.0` when unknown.
    pub duration_sec: f64,
}

/// One captured video frame plus the source duration.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Decoded frame.
    pub image: DecodedImage,
    /// Source duration in seconds.
    pub duration_sec: f64,
}

/// Clamp a seek position into the playable range of the source.
pub fn clamp_seek(at_secs: f64, duration_sec: f64) -> f64 {
    let at = if at_secs.is_finite() { at_secs } else { 0.0 };
    if duration_sec > 0.0 {
        at.clamp(0.0, duration_sec)
    } else {
        at.max(0.0)
    }
}

/// Probe `input` with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(input: &str) -> SceneforgeResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(input)
        .output()
        .map_err(|e| SceneforgeError::resource(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SceneforgeError::resource(format!(
            "ffprobe failed for '{input}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SceneforgeError::resource(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SceneforgeError::resource("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| SceneforgeError::resource("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SceneforgeError::resource("missing video height from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        input: input.to_string(),
        width,
        height,
        duration_sec,
    })
}

/// Probe `input` with `ffprobe`. Always fails without the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_input: &str) -> SceneforgeResult<VideoInfo> {
    Err(SceneforgeError::resource(
        "video layers require the 'media-ffmpeg' feature",
    ))
}

/// Decode the frame shown at `at_secs`.
#[cfg(feature = "media-ffmpeg")]
pub fn capture_frame(info: &VideoInfo, at_secs: f64) -> SceneforgeResult<VideoFrame> {
    let seek = clamp_seek(at_secs, info.duration_sec);
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{seek:.6}")])
        .arg("-i")
        .arg(&info.input)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| SceneforgeError::resource(format!("failed to run ffmpeg: {e}")))?;

    if !out.status.success() {
        return Err(SceneforgeError::resource(format!(
            "ffmpeg frame capture failed for '{}': {}",
            info.input,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = info.width as usize * info.height as usize * 4;
    if expected_len == 0 {
        return Err(SceneforgeError::resource(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(SceneforgeError::resource(format!(
            "decoded video frame is truncated: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }

    let mut rgba = out.stdout;
    rgba.truncate(expected_len);
    Ok(VideoFrame {
        image: DecodedImage::from_straight_rgba8(info.width, info.height, rgba),
        duration_sec: info.duration_sec,
    })
}

/// Decode the frame shown at `at_secs`. Always fails without the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn capture_frame(_info: &VideoInfo, _at_secs: f64) -> SceneforgeResult<VideoFrame> {
    Err(SceneforgeError::resource(
        "video layers require the 'media-ffmpeg' feature",
    ))
}
