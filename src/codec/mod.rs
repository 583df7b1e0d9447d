//! Image decode/encode capability
//!
//! The converter never touches pixel data directly. It goes through the
//! [`ImageCodec`] trait, which turns source bytes into a [`Raster`] and a raster
//! back into encoded bytes for a [`TargetFormat`](crate::TargetFormat).
//!
//! - [`ImageRsCodec`]: default implementation on top of the `image` crate
//!
//! ## Usage
//!
//! ```no_run
//! use image_converter::codec::{ImageCodec, ImageRsCodec};
//! use image_converter::{Quality, TargetFormat};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = ImageRsCodec::new();
//! let bytes: Arc<[u8]> = std::fs::read("photo.png")?.into();
//!
//! let raster = codec.decode("photo.png", bytes).await?;
//! let webp = codec
//!     .encode("photo.png", raster, TargetFormat::Webp, Quality::new(80)?)
//!     .await?;
//! println!("encoded {} bytes", webp.len());
//! # Ok(())
//! # }
//! ```

mod image_rs;
mod traits;

pub use image_rs::ImageRsCodec;
pub use traits::{ImageCodec, Raster};
