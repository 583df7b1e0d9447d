//! Archive bundling capability
//!
//! Converted files are bundled through the [`ArchiveBuilder`] trait. The default
//! [`ZipArchiveBuilder`] writes an in-memory ZIP archive.

mod zip;

pub use self::zip::ZipArchiveBuilder;

use crate::error::Result;
use std::sync::Arc;

/// One named file to put in an archive
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    /// Name inside the archive
    pub name: String,
    /// File content
    pub bytes: Arc<[u8]>,
}

/// Trait for building a single archive out of named byte blobs
///
/// Building is synchronous; the converter runs it on the blocking thread pool.
pub trait ArchiveBuilder: Send + Sync {
    /// Build an archive containing `entries`, in order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`](crate::Error::Archive) if the archive cannot be written.
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
