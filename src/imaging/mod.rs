//! Image resizing: sizing core plus a pluggable raster backend.
//!
//! | Step | Where |
//! |---|---|
//! | **Output size** | [`calculate_output_size`] (explicit size, then one max bound) |
//! | **Placement** | [`plan_geometry`] (FIT letterbox or FILL crop, nine anchors) |
//! | **Codec params** | [`map_quality`] (JPEG / WebP / PNG) |
//! | **Pixels** | [`RasterBackend`], implemented by [`RustBackend`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Quality normalization and encoder parameter lists
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **Operations**: The resize pipeline combining calculations + backend

pub mod backend;
mod calculations;
mod error;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, RasterBackend};
pub use calculations::{
    Geometry, Rect, Size, calculate_output_size, gravity_origin, plan_geometry,
};
pub use error::ResizeError;
pub use operations::{Plan, ProcessResult, plan, resize_with_backend};
pub use params::{CodecParam, CodecParams, DEFAULT_QUALITY, Quality, map_quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
