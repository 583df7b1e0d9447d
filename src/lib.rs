//! # image-converter
//!
//! Backend library for browser-style batch image conversion.
//!
//! ## Design Philosophy
//!
//! image-converter is designed to be:
//! - **Session-based** - One [`ImageConverter`] holds the files, the selected format and a status line
//! - **Failure-tolerant** - A file that fails to convert never stops the rest of a batch
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! JPEG, PNG and WebP files go in; every file is converted to the selected target
//! format and the results can be bundled into one ZIP archive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_converter::{Config, ImageConverter, SourceFile, TargetFormat};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ImageConverter::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = converter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let photo = SourceFile::from_path(Path::new("holiday.jpg")).await?;
//!     converter.add_files(vec![photo]).await;
//!
//!     converter.select_format(TargetFormat::Webp).await?;
//!     converter.set_quality(60).await?;
//!
//!     let bundle = converter.bundle().await?;
//!     bundle.save_to(Path::new(".")).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive bundling capability
pub mod archive;
/// Image decode/encode capability
pub mod codec;
/// Configuration types
pub mod config;
/// Conversion session (decomposed into focused submodules)
pub mod converter;
/// Error types
pub mod error;
/// File registry
pub mod registry;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use archive::{ArchiveBuilder, ArchiveEntry, ZipArchiveBuilder};
pub use codec::{ImageCodec, ImageRsCodec, Raster};
pub use config::Config;
pub use converter::ImageConverter;
pub use error::{ConversionError, Error, Result};
pub use types::{
    Bundle, ConvertedFile, EntryId, EntryStatus, EntryView, Event, IngestReport, MessageKind,
    Outcome, Quality, SessionSnapshot, SourceFile, StatusMessage, Summary, TargetFormat,
};
