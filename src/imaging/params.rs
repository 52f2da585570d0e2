//! Encoder parameter types.
//!
//! These types describe *what* the encoder should do, not *how*. The
//! [`backend`](super::backend) receives a [`CodecParams`] list and reads the
//! keys it understands.
//!
//! ## Types
//!
//! - [`Quality`]: 0–100 quality, clamped on construction, 0 replaced by 85.
//! - [`CodecParam`]: key of one native encoder option.
//! - [`CodecParams`]: ordered `(key, value)` list for one encode call.

use crate::options::Format;
use serde::Serialize;

/// Quality used when the caller leaves it at 0.
pub const DEFAULT_QUALITY: u32 = 85;

/// Normalized encoding quality (1–100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(u32);

impl Quality {
    /// Clamp to 0–100, then substitute [`DEFAULT_QUALITY`] for 0.
    pub fn new(value: i32) -> Self {
        let clamped = value.clamp(0, 100) as u32;
        if clamped == 0 {
            Self(DEFAULT_QUALITY)
        } else {
            Self(clamped)
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Native encoder option keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecParam {
    /// 0–100, higher is better.
    JpegQuality,
    /// Present with value 1 when progressive scans are requested.
    JpegProgressive,
    /// 1–100, higher is better.
    WebpQuality,
    /// 0–9, higher is smaller and slower.
    PngCompression,
}

/// Ordered encoder options for one encode call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodecParams(Vec<(CodecParam, i32)>);

impl CodecParams {
    pub fn push(&mut self, key: CodecParam, value: i32) {
        self.0.push((key, value));
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: CodecParam) -> Option<i32> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CodecParam, i32)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derive the encoder options for `format` from a raw 0–100 quality.
///
/// All formats share the clamp-then-default step. WEBP then treats a raw
/// quality of exactly 0 as its own floor of 1 instead of the shared default;
/// negative input is clamped first and so still gets the default.
pub fn map_quality(format: Format, quality: i32, progressive: bool) -> CodecParams {
    let normalized = Quality::new(quality).value() as i32;
    let mut params = CodecParams::default();

    match format {
        Format::Jpeg => {
            params.push(CodecParam::JpegQuality, normalized);
            if progressive {
                params.push(CodecParam::JpegProgressive, 1);
            }
        }
        Format::Webp => {
            let native = if quality == 0 { 1 } else { normalized };
            params.push(CodecParam::WebpQuality, native);
        }
        Format::Png => {
            let level = ((100 - normalized) / 10).clamp(0, 9);
            params.push(CodecParam::PngCompression, level);
        }
    }

    params
}
