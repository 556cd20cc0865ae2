//! CSS color strings as they appear in layer attributes.

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SceneforgeError, SceneforgeResult};

/// Straight-alpha color with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Color from straight-alpha channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied RGBA8, channels clamped to `0..=1` first.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        Rgba8Premul {
            r: to_u8(self.r.clamp(0.0, 1.0) * a),
            g: to_u8(self.g.clamp(0.0, 1.0) * a),
            b: to_u8(self.b.clamp(0.0, 1.0) * a),
            a: to_u8(a),
        }
    }

    /// Straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }

    /// `#rrggbb` form, dropping alpha.
    pub fn to_hex_rgb(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Parse a CSS color. `None` means "paint nothing" (`none`, `transparent`, empty).
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` and a small set of
/// named colors.
pub fn parse_css_color(s: &str) -> SceneforgeResult<Option<Color>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("transparent") {
        return Ok(None);
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map(Some).map_err(SceneforgeError::validation);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args)
            .map(Some)
            .map_err(SceneforgeError::validation);
    }
    named(&lower)
        .map(Some)
        .ok_or_else(|| SceneforgeError::validation(format!("unsupported color \"{s}\"")))
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }

    let b = s.as_bytes();
    let bytes: Vec<u8> = match b.len() {
        3 | 4 => b
            .iter()
            .map(|&c| nibble(c).map(|n| n * 17))
            .collect::<Result<Vec<u8>, String>>()?,
        6 | 8 => b
            .chunks_exact(2)
            .map(|p| -> Result<u8, String> { Ok(nibble(p[0])? * 16 + nibble(p[1])?) })
            .collect::<Result<Vec<u8>, String>>()?,
        _ => return Err("hex color must be #rgb, #rgba, #rrggbb or #rrggbbaa".to_owned()),
    };
    let a = bytes.get(3).copied().unwrap_or(255);
    Ok(Color::rgba(
        f64::from(bytes[0]) / 255.0,
        f64::from(bytes[1]) / 255.0,
        f64::from(bytes[2]) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn parse_rgb_args(args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb() expects 3 or 4 components, got {}", parts.len()));
    }
    let channel = |p: &str| -> Result<f64, String> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
            return Ok(v / 100.0);
        }
        let v: f64 = p.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
        Ok(v / 255.0)
    };
    let alpha = match parts.get(3) {
        Some(p) => p
            .parse::<f64>()
            .map_err(|_| format!("invalid alpha \"{p}\""))?,
        None => 1.0,
    };
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "navy" => (0, 0, 128),
        _ => return None,
    };
    Some(Color::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        1.0,
    ))
}
