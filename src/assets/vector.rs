//! SVG sources for vector layers.

use std::collections::BTreeMap;

use anyhow::Context;

use crate::assets::decode::{self, VectorAsset};
use crate::foundation::error::SceneforgeResult;

/// Parse SVG bytes after rewriting colors through `color_map`.
pub fn load_vector(
    bytes: &[u8],
    color_map: Option<&BTreeMap<String, String>>,
) -> SceneforgeResult<VectorAsset> {
    match color_map {
        Some(map) if !map.is_empty() => {
            let text = std::str::from_utf8(bytes).context("svg source is not utf-8")?;
            let recolored = apply_color_map(text, map);
            decode::parse_svg(recolored.as_bytes())
        }
        _ => decode::parse_svg(bytes),
    }
}

/// Replace every whole occurrence of each source color (ASCII case-insensitive).
///
/// A match must not run into further alphanumerics, so `#fff` never rewrites part of `#ffffff`.
pub fn apply_color_map(svg: &str, map: &BTreeMap<String, String>) -> String {
    let mut out = svg.to_string();
    for (from, to) in map {
        if from.is_empty() {
            continue;
        }
        out = replace_color(&out, from, to);
    }
    out
}

fn replace_color(haystack: &str, from: &str, to: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let needle = from.to_ascii_lowercase();
    let bytes = haystack.as_bytes();

    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    let mut search = 0;
    while let Some(rel) = lower[search..].find(&needle) {
        let start = search + rel;
        let end = start + needle.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            out.push_str(&haystack[cursor..start]);
            out.push_str(to);
            cursor = end;
        }
        search = end;
    }
    out.push_str(&haystack[cursor..]);
    out
}
