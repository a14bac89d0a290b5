//! Embedded texture export
//!
//! Converts scene textures to standalone image files (TGA, PNG, BMP, JPEG).
//! Failures are reported per texture and never abort the caller.

mod converter;

pub use converter::{
    texture_to_image, ExportOutcome, ImageFormat, SkipReason, TextureExportOptions,
    TextureExporter,
};

use thiserror::Error;

/// Texture conversion errors
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("No encoder compiled in for {0}")]
    NoEncoder(ImageFormat),
}

pub type TextureResult<T> = Result<T, TextureError>;
