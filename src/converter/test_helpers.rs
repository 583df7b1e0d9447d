//! Shared test helpers for creating ImageConverter instances in tests.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast};

use crate::archive::ZipArchiveBuilder;
use crate::codec::{ImageCodec, ImageRsCodec, Raster};
use crate::config::Config;
use crate::converter::ImageConverter;
use crate::error::ConversionError;
use crate::types::{Event, Quality, SourceFile, TargetFormat};

/// Debounce delay used by test converters
pub(crate) const TEST_DEBOUNCE: Duration = Duration::from_millis(40);

fn gradient(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([(x * 7) as u8, (y * 11) as u8, 90, 255]);
    }
    img
}

/// Encode a small gradient image in `format`
pub(crate) fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(gradient(width, height));
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// A decodable 8x6 PNG source file
pub(crate) fn png_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", image_bytes(8, 6, ImageFormat::Png))
}

/// A decodable 8x6 JPEG source file
pub(crate) fn jpeg_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/jpeg", image_bytes(8, 6, ImageFormat::Jpeg))
}

/// A file declared as PNG whose content cannot be decoded
pub(crate) fn corrupt_png_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", b"\x89PNG but then nothing useful".to_vec())
}

/// A file with a refused type
pub(crate) fn text_file(name: &str) -> SourceFile {
    SourceFile::new(name, "text/plain", b"not an image".to_vec())
}

/// Config with a short debounce so tests do not wait 250ms per change
pub(crate) fn test_config() -> Config {
    Config {
        quality_debounce: TEST_DEBOUNCE,
        ..Config::default()
    }
}

/// Converter with the real codec and archiver
pub(crate) fn create_test_converter() -> ImageConverter {
    ImageConverter::new(test_config()).unwrap()
}

/// Converter with a custom codec
pub(crate) fn create_converter_with_codec(codec: Arc<dyn ImageCodec>) -> ImageConverter {
    ImageConverter::with_capabilities(test_config(), codec, Arc::new(ZipArchiveBuilder::new()))
        .unwrap()
}

/// Collect every event already buffered in `rx`
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait for the next `BatchComplete` event
pub(crate) async fn next_batch_complete(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.unwrap();
            if matches!(event, Event::BatchComplete { .. }) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for BatchComplete")
}

/// Codec whose encoder succeeds with zero bytes
pub(crate) struct EmptyOutputCodec;

#[async_trait]
impl ImageCodec for EmptyOutputCodec {
    async fn decode(&self, name: &str, bytes: Arc<[u8]>) -> Result<Raster, ConversionError> {
        ImageRsCodec::new().decode(name, bytes).await
    }

    async fn encode(
        &self,
        _name: &str,
        _raster: Raster,
        _format: TargetFormat,
        _quality: Quality,
    ) -> Result<Vec<u8>, ConversionError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "empty-output"
    }
}

/// Codec that holds every encode of `gated` until [`GatedCodec::open`] is called
pub(crate) struct GatedCodec {
    gated: TargetFormat,
    gate: Arc<Semaphore>,
}

impl GatedCodec {
    pub(crate) fn new(gated: TargetFormat) -> Arc<Self> {
        Arc::new(Self {
            gated,
            gate: Arc::new(Semaphore::new(0)),
        })
    }

    /// Let every held and future encode through
    pub(crate) fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl ImageCodec for GatedCodec {
    async fn decode(&self, name: &str, bytes: Arc<[u8]>) -> Result<Raster, ConversionError> {
        ImageRsCodec::new().decode(name, bytes).await
    }

    async fn encode(
        &self,
        name: &str,
        raster: Raster,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ConversionError> {
        if format == self.gated {
            let _permit = self.gate.acquire().await.unwrap();
        }
        ImageRsCodec::new().encode(name, raster, format, quality).await
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}
