//! Convert every image in a folder example
//!
//! This example adds every file of a directory to a session, converts them to the
//! requested format and writes both the individual files and a ZIP bundle.
//!
//! Usage: `cargo run --example convert_folder -- <input dir> <output dir> [png|jpeg|webp] [quality]`
//!
//! Set `RUST_LOG=image_converter=debug` to see per-file logging.

use image_converter::{Config, Event, ImageConverter, Quality, TargetFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().ok_or("missing input directory")?);
    let output = PathBuf::from(args.next().ok_or("missing output directory")?);
    let format: TargetFormat = args.next().as_deref().unwrap_or("webp").parse()?;
    let quality: Option<u32> = args.next().map(|q| q.parse()).transpose()?;

    let mut config = Config::default();
    if let Some(percent) = quality {
        let quality = Quality::new(percent)?;
        config.default_jpeg_quality = quality;
        config.default_webp_quality = quality;
    }
    let converter = ImageConverter::new(config)?;

    // Progress subscriber - prints one line per file
    let mut events = converter.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Converted {
                    name, size_bytes, ..
                } => println!("  converted {} ({} bytes)", name, size_bytes),
                Event::ConversionFailed { error, .. } => println!("  failed: {}", error),
                Event::FilesRejected { names } => println!("  ignored: {}", names.join(", ")),
                _ => {}
            }
        }
    });

    let mut paths = Vec::new();
    let mut dir = tokio::fs::read_dir(&input).await?;
    while let Some(entry) = dir.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let report = converter.add_paths(&paths).await?;
    println!(
        "Added {} file(s), ignored {} from {}",
        report.accepted,
        report.rejected,
        input.display()
    );

    let summary = converter.select_format(format).await?;

    if let Some(message) = converter.message().await {
        println!("{}", message.text);
    }
    println!(
        "{} attempted, {} succeeded, {} failed",
        summary.attempted, summary.succeeded, summary.failed
    );

    let written = converter.save_all(&output).await?;
    println!("Wrote {} file(s) to {}", written.len(), output.display());

    match converter.bundle().await {
        Ok(bundle) => {
            let path = bundle.save_to(&output).await?;
            println!("Bundle: {} ({} files)", path.display(), bundle.entry_count);
        }
        Err(e) => println!("No bundle: {}", e),
    }

    Ok(())
}
