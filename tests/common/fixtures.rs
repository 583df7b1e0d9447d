//! Test fixtures: source images generated with the `image` crate

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use image_converter::{Config, ImageConverter, SourceFile};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Debounce delay for integration converters
pub const DEBOUNCE: Duration = Duration::from_millis(50);

/// Build a checkerboard image with an alpha channel
pub fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([240, 240, 240, 255])
        } else {
            Rgba([20, 60, 200, 128])
        }
    })
}

/// Encode an image of the given size in `format`
pub fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(checkerboard(width, height));
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .expect("failed to encode fixture");
    buf.into_inner()
}

/// In-memory PNG source file
pub fn png(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", encoded(width, height, ImageFormat::Png))
}

/// In-memory JPEG source file
pub fn jpeg(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/jpeg", encoded(width, height, ImageFormat::Jpeg))
}

/// In-memory WebP source file
pub fn webp(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/webp", encoded(width, height, ImageFormat::WebP))
}

/// File declared as JPEG that holds text
pub fn mislabeled(name: &str) -> SourceFile {
    SourceFile::new(name, "image/jpeg", b"this is not a jpeg".to_vec())
}

/// Write an encoded image into `dir` and return its path
pub fn write_image(dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encoded(16, 12, format)).expect("failed to write fixture");
    path
}

/// Converter with a short debounce
pub fn converter() -> ImageConverter {
    let config = Config {
        quality_debounce: DEBOUNCE,
        ..Config::default()
    };
    ImageConverter::new(config).expect("default config is valid")
}
