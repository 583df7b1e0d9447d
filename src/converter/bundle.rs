//! ZIP bundling and saving of converted files

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::ImageConverter;
use crate::archive::ArchiveEntry;
use crate::error::{Error, Result};
use crate::types::{Bundle, ConvertedFile, StatusMessage};
use crate::utils::unique_name;

/// Status line shown when a bundle is requested with nothing converted
pub(crate) const EMPTY_BUNDLE_MESSAGE: &str = "No successful conversions to download.";

impl ImageConverter {
    /// Bundle every converted file into one archive
    ///
    /// Entries without an output are skipped. Outputs that share a name get a
    /// counter suffix (`photo (1).webp`) so no archive entry shadows another.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyBundle`] if no entry has a converted output; the status line
    ///   says so as well
    /// - [`Error::Archive`] if the archive cannot be written
    pub async fn bundle(&self) -> Result<Bundle> {
        let entries: Vec<ArchiveEntry> = self
            .unique_outputs()
            .await
            .into_iter()
            .map(|file| ArchiveEntry {
                name: file.name,
                bytes: file.bytes,
            })
            .collect();

        if entries.is_empty() {
            warn!("bundle requested with no converted files");
            self.state.write().await.message = Some(StatusMessage::error(EMPTY_BUNDLE_MESSAGE));
            return Err(Error::EmptyBundle);
        }

        let entry_count = entries.len();
        let archiver = Arc::clone(&self.archiver);
        let bytes = tokio::task::spawn_blocking(move || archiver.build(&entries)).await??;

        info!(
            archiver = self.archiver.name(),
            entries = entry_count,
            size = bytes.len(),
            "bundle created"
        );

        Ok(Bundle {
            file_name: self.config.archive_name.clone(),
            bytes,
            entry_count,
        })
    }

    /// Write every converted file into `dir`, creating it if needed
    ///
    /// Names are deduplicated the same way as in [`bundle`](Self::bundle). Returns
    /// the written paths in entry order; an empty session writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or a file cannot be written.
    pub async fn save_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io_at(dir, e))?;

        let mut written = Vec::new();
        for file in self.unique_outputs().await {
            written.push(file.save_to(dir).await?);
        }

        info!(dir = %dir.display(), files = written.len(), "converted files saved");
        Ok(written)
    }

    /// Converted outputs in entry order, renamed where names collide
    async fn unique_outputs(&self) -> Vec<ConvertedFile> {
        let state = self.state.read().await;
        let mut taken = HashSet::new();
        state
            .registry
            .converted()
            .map(|(_, file)| ConvertedFile {
                name: unique_name(&file.name, &mut taken),
                format: file.format,
                bytes: Arc::clone(&file.bytes),
            })
            .collect()
    }
}
