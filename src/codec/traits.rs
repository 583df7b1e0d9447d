//! Traits and types for the codec capability

use async_trait::async_trait;
use image::RgbaImage;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::types::{Quality, TargetFormat};

/// Decoded pixel buffer, 8-bit RGBA
///
/// This is the equivalent of drawing the decoded image onto a blank canvas:
/// whatever the source color type, the raster is always RGBA8.
#[derive(Clone, Debug)]
pub struct Raster {
    pixels: RgbaImage,
}

impl Raster {
    /// Wrap an RGBA image
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the pixel buffer
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take the pixel buffer
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Trait for image decoding and encoding
///
/// Implementations must be cheap to share across tasks; the converter holds one
/// behind an `Arc` and calls it concurrently for every entry of a batch.
///
/// `name` is the source file name and is only used for error messages.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Decode source bytes into a raster
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Decode`] when the bytes are not a decodable image.
    async fn decode(&self, name: &str, bytes: Arc<[u8]>) -> Result<Raster, ConversionError>;

    /// Encode a raster in `format`
    ///
    /// `quality` only applies to lossy formats; callers pass [`Quality::FULL`] for
    /// lossless ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Encode`] when the format/quality combination cannot
    /// be produced.
    async fn encode(
        &self,
        name: &str,
        raster: Raster,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ConversionError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
