//! High-level resize operation.
//!
//! [`plan`] combines the pure calculations into a [`Plan`]; [`resize_with_backend`]
//! executes a plan against a [`RasterBackend`].

use super::backend::{Dimensions, RasterBackend};
use super::calculations::{Geometry, Size, calculate_output_size, plan_geometry};
use super::error::ResizeError;
use super::params::{CodecParams, map_quality};
use crate::options::{Format, Options};
use serde::Serialize;

/// Result type for resize operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Encoded output of one resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Every decision for one image, computed without touching pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub source: Dimensions,
    pub geometry: Geometry,
    pub format: Format,
    pub params: CodecParams,
}

impl Plan {
    pub fn output(&self) -> Size {
        self.geometry.output()
    }
}

/// Plan a resize without executing it.
pub fn plan(options: &Options, source: Dimensions) -> Result<Plan> {
    let output = calculate_output_size(options, source);
    let geometry = plan_geometry(output, source, options.algo, options.gravity)?;
    let params = map_quality(options.format, options.quality, options.progressive);

    log::debug!(
        "{}x{} -> {}x{} ({}, {}, ratio {:.4}), {} {:?}",
        source.width,
        source.height,
        output.width,
        output.height,
        options.algo,
        options.gravity,
        geometry.ratio(),
        options.format,
        params
    );

    Ok(Plan {
        source,
        geometry,
        format: options.format,
        params,
    })
}

/// Decode, resize and re-encode `data` according to `options`.
///
/// Every raster created along the way is dropped before returning, on the
/// error paths too.
pub fn resize_with_backend<B: RasterBackend>(
    backend: &B,
    data: &[u8],
    options: &Options,
) -> Result<ProcessResult> {
    if data.is_empty() {
        return Err(ResizeError::NoData);
    }

    let source = backend.decode(data).map_err(ResizeError::decode)?;
    let dims = backend.dimensions(&source);
    if dims.width == 0 || dims.height == 0 {
        return Err(ResizeError::InvalidSourceFormat);
    }

    let plan = plan(options, dims)?;

    let output = match plan.geometry {
        Geometry::Fit {
            canvas, placement, ..
        } => {
            let mut dst = backend.canvas(&source, canvas);
            backend.fill(&mut dst, options.background);
            let placed = backend.resize(&source, placement.size());
            backend.paste(&mut dst, &placed, placement.x, placement.y);
            dst
        }
        Geometry::Fill {
            intermediate, crop, ..
        } => {
            let mid = backend.resize(&source, intermediate);
            backend.crop(&mid, crop)
        }
    };
    drop(source);

    let data = backend
        .encode(&output, plan.format, &plan.params)
        .map_err(ResizeError::encode)?;

    let size = plan.output();
    Ok(ProcessResult {
        width: size.width,
        height: size.height,
        data,
    })
}
