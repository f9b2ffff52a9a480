//! Slide image decoding and JPEG encoding of rendered views.
//!
//! Slides are decoded once into an RGB buffer (JPEG or PNG, detected from
//! the content). Rendered views are encoded as JPEG at a configurable quality.

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage};

use crate::error::RenderError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Encoder for rendered viewer frames.
#[derive(Debug, Clone, Default)]
pub struct ViewEncoder {}

impl ViewEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a rendered view as JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidQuality`] for quality outside 1-100, or
    /// [`RenderError::EncodeError`] if the encoder fails.
    pub fn encode(&self, view: &RgbImage, quality: u8) -> Result<Bytes, RenderError> {
        if !is_valid_quality(quality) {
            return Err(RenderError::InvalidQuality { quality });
        }

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

        encoder
            .encode_image(view)
            .map_err(|e| RenderError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    /// Decode an in-memory slide image to RGB.
    pub fn decode(&self, source: &[u8]) -> Result<RgbImage, RenderError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| RenderError::DecodeError {
                message: e.to_string(),
            })?;

        let img = reader.decode().map_err(|e| RenderError::DecodeError {
            message: e.to_string(),
        })?;

        Ok(img.to_rgb8())
    }

    /// Read and decode a slide image from disk.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<RgbImage, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| RenderError::DecodeError {
            message: format!("{}: {}", path.display(), e),
        })?;
        self.decode(&data)
    }
}

/// Validate JPEG quality parameter.
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}
