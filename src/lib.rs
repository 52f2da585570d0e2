//! # trez
//!
//! Image resizing with a small, exact sizing core. Given encoded bytes and a
//! set of [`Options`], trez decides the output size, places or crops the
//! image on a canvas, and re-encodes it as JPEG, WebP or PNG.
//!
//! # Pipeline
//!
//! ```text
//! bytes ─ decode ─ output size ─ geometry ─ pixels ─ encode ─ ProcessResult
//!                  (max_side,    (fit: letterbox,
//!                   max_height,   fill: cover + crop,
//!                   max_width)    nine gravity anchors)
//! ```
//!
//! Every decision before the pixel work is a pure function of the options
//! and the source size, so [`imaging::plan`] can report it without decoding
//! anything but the header of the source.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`options`] | Caller-facing knobs: [`Algo`], [`Gravity`], [`Format`], [`Background`] |
//! | [`imaging`] | Sizing core, codec parameter mapping, and the raster backend seam |
//! | [`config`] | `trez.toml` loading, validation and merging |
//! | [`batch`] | Parallel resizing of many files with progress events |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Truncation, Not Rounding
//!
//! Scaled sizes are truncated toward zero at every step. A 1000×800 image
//! bounded to 333 wide comes out 333×266, never 333×267. Callers that compare
//! against sizes produced by other tools should expect the same floor.
//!
//! ## Owned Rasters
//!
//! Backends return owned raster values. Every intermediate buffer (decoded
//! source, resized copy, canvas) is freed by `Drop` as soon as it goes out of
//! scope, on success and on every error path.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod options;
pub mod output;

pub use imaging::{ProcessResult, ResizeError};
pub use options::{Algo, Background, Format, Gravity, Options};

/// Resize encoded image `data` with the pure-Rust `image` backend.
///
/// ```no_run
/// let data = std::fs::read("photo.png").unwrap();
/// let options = trez::Options {
///     max_side: 800,
///     format: trez::Format::Webp,
///     ..Default::default()
/// };
/// let result = trez::resize(&data, &options).unwrap();
/// std::fs::write("photo.webp", &result.data).unwrap();
/// ```
pub fn resize(data: &[u8], options: &Options) -> Result<ProcessResult, ResizeError> {
    imaging::resize_with_backend(&imaging::RustBackend::new(), data, options)
}

/// Plan a resize of encoded `data` from its header alone.
///
/// Fails the same way [`resize`] would before any pixels are touched.
pub fn plan(data: &[u8], options: &Options) -> Result<imaging::Plan, ResizeError> {
    if data.is_empty() {
        return Err(ResizeError::NoData);
    }
    let source = imaging::RustBackend::new()
        .header_dimensions(data)
        .map_err(ResizeError::decode)?;
    if source.width == 0 || source.height == 0 {
        return Err(ResizeError::InvalidSourceFormat);
    }
    imaging::plan(options, source)
}
