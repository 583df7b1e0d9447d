use std::io::{Cursor, Write};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use super::{ArchiveBuilder, ArchiveEntry};
use crate::error::{Error, Result};

/// In-memory ZIP writer
///
/// Encoded images are already compressed, so entries are stored by default;
/// use [`ZipArchiveBuilder::deflated`] to compress them anyway.
#[derive(Debug, Clone, Copy)]
pub struct ZipArchiveBuilder {
    compression: CompressionMethod,
}

impl Default for ZipArchiveBuilder {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }
}

impl ZipArchiveBuilder {
    /// Builder that stores entries uncompressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that deflates every entry
    pub fn deflated() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(self.compression);

        for entry in entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.bytes).map_err(|e| {
                Error::Archive(format!("failed to write {} into archive: {}", entry.name, e))
            })?;
        }

        let cursor = writer.finish()?;
        let bytes = cursor.into_inner();
        debug!(
            entries = entries.len(),
            size = bytes.len(),
            "built ZIP archive"
        );
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
