use super::backend::BackendError;
use thiserror::Error;

/// Terminal failures of a single resize. No partial result is ever returned.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("image data length is zero")]
    NoData,
    #[error("invalid data source format")]
    InvalidSourceFormat,
    #[error("error during encoding")]
    Encoding,
}

impl ResizeError {
    /// Map a backend decode failure.
    pub(crate) fn decode(err: BackendError) -> Self {
        log::debug!("decode failed: {err}");
        ResizeError::InvalidSourceFormat
    }

    /// Map a backend encode failure.
    pub(crate) fn encode(err: BackendError) -> Self {
        log::debug!("encode failed: {err}");
        ResizeError::Encoding
    }
}
