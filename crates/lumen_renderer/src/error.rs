//! Error types for render setup.
//!
//! Tracing itself never fails: degenerate geometry and numerical edge
//! cases are skipped silently. Only configuration and resource loading
//! produce errors.

use thiserror::Error;

use crate::TextureError;

/// Errors that can occur while preparing a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Thread count {0} is not a non-zero perfect square")]
    ThreadCount(u32),

    #[error("Bucket grid {ratio}x{ratio} does not fit a {width}x{height} image")]
    BucketGrid { ratio: u32, width: u32, height: u32 },

    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),
}

pub type RenderResult<T> = Result<T, RenderError>;
