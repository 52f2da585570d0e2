//! Raster backend trait and shared types.
//!
//! The [`RasterBackend`] trait is the seam between the sizing core and the
//! library that owns pixels. It covers exactly what a resize needs: decode,
//! resize, canvas/fill/paste for letterboxing, crop, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Rasters are plain owned values, so every intermediate buffer is
//! released by `Drop` on all exit paths, including early error returns.

use super::calculations::{Rect, Size};
use super::params::CodecParams;
use crate::options::{Background, Format};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Natural size of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Pixel operations the resize pipeline delegates.
///
/// `Sync` so one backend can be shared across a rayon pool.
pub trait RasterBackend: Sync {
    type Raster;

    /// Decode compressed bytes of any supported format.
    fn decode(&self, data: &[u8]) -> Result<Self::Raster, BackendError>;

    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Resample to exactly `size`.
    fn resize(&self, raster: &Self::Raster, size: Size) -> Self::Raster;

    /// Blank raster of `size` with the same pixel layout as `like`.
    fn canvas(&self, like: &Self::Raster, size: Size) -> Self::Raster;

    /// Paint the whole raster with one colour.
    fn fill(&self, raster: &mut Self::Raster, color: Background);

    /// Composite `top` onto `canvas` with its top-left corner at `(x, y)`.
    fn paste(&self, canvas: &mut Self::Raster, top: &Self::Raster, x: u32, y: u32);

    /// Copy out the sub-rectangle `rect`.
    fn crop(&self, raster: &Self::Raster, rect: Rect) -> Self::Raster;

    /// Compress with the codec named by `format`.
    fn encode(
        &self,
        raster: &Self::Raster,
        format: Format,
        params: &CodecParams,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Stand-in raster: only the size is tracked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockRaster {
        pub width: u32,
        pub height: u32,
    }

    /// Mock backend that records operations without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        /// Size reported by `decode`; `None` makes decode fail.
        pub decoded: Option<Dimensions>,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Resize { width: u32, height: u32 },
        Canvas { width: u32, height: u32 },
        Fill([u8; 3]),
        Paste { x: u32, y: u32, width: u32, height: u32 },
        Crop(Rect),
        Encode { format: Format, params: CodecParams },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_source(width: u32, height: u32) -> Self {
            Self {
                decoded: Some(Dimensions { width, height }),
                ..Self::default()
            }
        }

        pub fn failing_encode(width: u32, height: u32) -> Self {
            Self {
                fail_encode: true,
                ..Self::with_source(width, height)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl RasterBackend for MockBackend {
        type Raster = MockRaster;

        fn decode(&self, data: &[u8]) -> Result<MockRaster, BackendError> {
            self.record(RecordedOp::Decode(data.len()));
            self.decoded
                .map(|d| MockRaster {
                    width: d.width,
                    height: d.height,
                })
                .ok_or_else(|| BackendError::Decode("No mock source".to_string()))
        }

        fn dimensions(&self, raster: &MockRaster) -> Dimensions {
            Dimensions {
                width: raster.width,
                height: raster.height,
            }
        }

        fn resize(&self, _raster: &MockRaster, size: Size) -> MockRaster {
            self.record(RecordedOp::Resize {
                width: size.width,
                height: size.height,
            });
            MockRaster {
                width: size.width,
                height: size.height,
            }
        }

        fn canvas(&self, _like: &MockRaster, size: Size) -> MockRaster {
            self.record(RecordedOp::Canvas {
                width: size.width,
                height: size.height,
            });
            MockRaster {
                width: size.width,
                height: size.height,
            }
        }

        fn fill(&self, _raster: &mut MockRaster, color: Background) {
            self.record(RecordedOp::Fill(color.0));
        }

        fn paste(&self, _canvas: &mut MockRaster, top: &MockRaster, x: u32, y: u32) {
            self.record(RecordedOp::Paste {
                x,
                y,
                width: top.width,
                height: top.height,
            });
        }

        fn crop(&self, _raster: &MockRaster, rect: Rect) -> MockRaster {
            self.record(RecordedOp::Crop(rect));
            MockRaster {
                width: rect.width,
                height: rect.height,
            }
        }

        fn encode(
            &self,
            raster: &MockRaster,
            format: Format,
            params: &CodecParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode {
                format,
                params: params.clone(),
            });
            if self.fail_encode {
                return Err(BackendError::Encode("mock encoder failure".to_string()));
            }
            // Encoded payload is the raster size, enough to assert on
            Ok(format!("{}x{}", raster.width, raster.height).into_bytes())
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_source(800, 600);

        let raster = backend.decode(&[1, 2, 3]).unwrap();
        assert_eq!(
            backend.dimensions(&raster),
            Dimensions {
                width: 800,
                height: 600
            }
        );

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(3)]);
    }

    #[test]
    fn mock_decode_without_source_fails() {
        let backend = MockBackend::new();
        assert!(matches!(backend.decode(&[0]), Err(BackendError::Decode(_))));
    }

    #[test]
    fn mock_records_crop() {
        let backend = MockBackend::new();
        let raster = MockRaster {
            width: 200,
            height: 100,
        };

        let cropped = backend.crop(&raster, Rect::new(50, 0, 100, 100));
        assert_eq!(cropped.width, 100);
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Crop(Rect { x: 50, width: 100, .. })
        ));
    }
}
