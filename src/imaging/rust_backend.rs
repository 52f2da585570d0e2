//! Pure Rust raster backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Resize | `DynamicImage::resize_exact` with the `Triangle` filter |
//! | Canvas / fill | `DynamicImage::new` + `GenericImage::put_pixel` |
//! | Paste (ROI write) | `image::imageops::replace` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//!
//! The `image` encoders are narrower than the parameter set computed by
//! [`map_quality`](super::params::map_quality): JPEG is always baseline,
//! WebP is always lossless, and PNG exposes three effort levels, so the 0–9
//! compression level is bucketed.

use super::backend::{BackendError, Dimensions, RasterBackend};
use super::calculations::{Rect, Size};
use super::params::{CodecParam, CodecParams, DEFAULT_QUALITY};
use crate::options::{Background, Format};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImage, ImageFormat, ImageReader, Rgba};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }

    /// Size of an encoded image, read from its header without decoding pixels.
    pub fn header_dimensions(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Bucket a 0–9 zlib-style level into the encoder's effort presets.
fn png_compression(level: i32) -> CompressionType {
    match level {
        i32::MIN..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_jpeg(raster: &DynamicImage, params: &CodecParams) -> Result<Vec<u8>, BackendError> {
    let quality = params
        .get(CodecParam::JpegQuality)
        .unwrap_or(DEFAULT_QUALITY as i32)
        .clamp(1, 100) as u8;
    if params.get(CodecParam::JpegProgressive).is_some() {
        log::warn!("progressive JPEG is not supported by the encoder; writing baseline");
    }

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(raster.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

fn encode_webp(raster: &DynamicImage, params: &CodecParams) -> Result<Vec<u8>, BackendError> {
    if let Some(quality) = params.get(CodecParam::WebpQuality) {
        log::debug!("WebP encoder is lossless; quality {quality} not applied");
    }

    let mut buf = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut buf);
    let pixels = if raster.color().has_alpha() {
        DynamicImage::ImageRgba8(raster.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(raster.to_rgb8())
    };
    pixels
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e}")))?;
    Ok(buf)
}

fn encode_png(raster: &DynamicImage, params: &CodecParams) -> Result<Vec<u8>, BackendError> {
    let level = params.get(CodecParam::PngCompression).unwrap_or(3);

    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, png_compression(level), PngFilter::Adaptive);
    raster
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

impl RasterBackend for RustBackend {
    type Raster = DynamicImage;

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions {
            width: raster.width(),
            height: raster.height(),
        }
    }

    fn resize(&self, raster: &DynamicImage, size: Size) -> DynamicImage {
        if size.is_empty() {
            return DynamicImage::new(size.width, size.height, raster.color());
        }
        raster.resize_exact(size.width, size.height, FilterType::Triangle)
    }

    fn canvas(&self, like: &DynamicImage, size: Size) -> DynamicImage {
        DynamicImage::new(size.width, size.height, like.color())
    }

    fn fill(&self, raster: &mut DynamicImage, color: Background) {
        let [r, g, b] = color.0;
        // Alpha, when the layout has one, stays fully transparent
        let pixel = Rgba([r, g, b, 0]);
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                raster.put_pixel(x, y, pixel);
            }
        }
    }

    fn paste(&self, canvas: &mut DynamicImage, top: &DynamicImage, x: u32, y: u32) {
        image::imageops::replace(canvas, top, x as i64, y as i64);
    }

    fn crop(&self, raster: &DynamicImage, rect: Rect) -> DynamicImage {
        raster.crop_imm(rect.x, rect.y, rect.width, rect.height)
    }

    fn encode(
        &self,
        raster: &DynamicImage,
        format: Format,
        params: &CodecParams,
    ) -> Result<Vec<u8>, BackendError> {
        if raster.width() == 0 || raster.height() == 0 {
            return Err(BackendError::Encode(format!(
                "cannot encode empty {}x{} raster",
                raster.width(),
                raster.height()
            )));
        }
        match format {
            Format::Jpeg => encode_jpeg(raster, params),
            Format::Webp => encode_webp(raster, params),
            Format::Png => encode_png(raster, params),
        }
    }
}
