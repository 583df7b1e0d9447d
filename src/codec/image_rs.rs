//! Codec backed by the `image` crate

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::debug;

use super::traits::{ImageCodec, Raster};
use crate::error::ConversionError;
use crate::types::{Quality, TargetFormat};

/// Default codec: decodes JPEG, PNG and WebP, encodes PNG, JPEG and WebP
///
/// Decoding and encoding are CPU-bound and run on the blocking thread pool.
///
/// JPEG output uses the `image` encoder with `quality` clamped to 1..=100, since the
/// encoder has no 0. WebP output is lossy and goes through libwebp, because the
/// `image` crate only writes lossless WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageRsCodec {
    /// Create the codec
    pub fn new() -> Self {
        Self
    }

    fn decode_blocking(name: &str, bytes: &[u8]) -> Result<Raster, ConversionError> {
        let format = image::guess_format(bytes).map_err(|e| ConversionError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
            return Err(ConversionError::Decode {
                name: name.to_string(),
                reason: format!("unsupported image format {:?}", format),
            });
        }

        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            ConversionError::Decode {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(
            name,
            ?format,
            width = decoded.width(),
            height = decoded.height(),
            "decoded source image"
        );
        Ok(Raster::new(decoded.to_rgba8()))
    }

    fn encode_blocking(
        name: &str,
        raster: Raster,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ConversionError> {
        let encode_err = |e: image::ImageError| ConversionError::Encode {
            name: name.to_string(),
            format: format.to_string(),
            reason: e.to_string(),
        };

        let mut buf = Cursor::new(Vec::new());
        let pixels = raster.into_pixels();

        match format {
            TargetFormat::Png => {
                DynamicImage::ImageRgba8(pixels)
                    .write_with_encoder(PngEncoder::new(&mut buf))
                    .map_err(encode_err)?;
            }
            TargetFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value().max(1));
                DynamicImage::ImageRgb8(rgb)
                    .write_with_encoder(encoder)
                    .map_err(encode_err)?;
            }
            TargetFormat::Webp => {
                let (width, height) = pixels.dimensions();
                let encoded = webp::Encoder::from_rgba(pixels.as_raw(), width, height)
                    .encode_simple(false, f32::from(quality.value()))
                    .map_err(|e| ConversionError::Encode {
                        name: name.to_string(),
                        format: format.to_string(),
                        reason: format!("libwebp: {:?}", e),
                    })?;
                buf.get_mut().extend_from_slice(&encoded);
            }
        }

        let bytes = buf.into_inner();
        debug!(name, %format, %quality, size = bytes.len(), "encoded raster");
        Ok(bytes)
    }
}

#[async_trait]
impl ImageCodec for ImageRsCodec {
    async fn decode(&self, name: &str, bytes: Arc<[u8]>) -> Result<Raster, ConversionError> {
        let owned_name = name.to_string();
        spawn_blocking(move || Self::decode_blocking(&owned_name, &bytes))
            .await
            .map_err(|e| ConversionError::Decode {
                name: name.to_string(),
                reason: format!("decode task failed: {}", e),
            })?
    }

    async fn encode(
        &self,
        name: &str,
        raster: Raster,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ConversionError> {
        let owned_name = name.to_string();
        spawn_blocking(move || Self::encode_blocking(&owned_name, raster, format, quality))
            .await
            .map_err(|e| ConversionError::Encode {
                name: name.to_string(),
                format: format.to_string(),
                reason: format!("encode task failed: {}", e),
            })?
    }

    fn name(&self) -> &'static str {
        "image-rs"
    }
}
