//! Adding, removing and clearing files

use std::path::PathBuf;
use tracing::{debug, info};

use super::ImageConverter;
use crate::error::Result;
use crate::types::{EntryId, Event, IngestReport, Quality, SourceFile, StatusMessage};

/// Status line shown when part of a submission was refused
pub(crate) const REJECTED_FILES_MESSAGE: &str =
    "Some files were ignored. Only JPG, PNG, or WebP are supported.";

impl ImageConverter {
    /// Add files to the session
    ///
    /// Files whose declared type is not JPEG, PNG or WebP are refused and listed in
    /// the report; refusing a file never fails the call. When a target format is
    /// already selected and at least one file was accepted, every active entry is
    /// converted again before this returns, and the batch summary is attached to the
    /// report.
    pub async fn add_files(&self, files: Vec<SourceFile>) -> IngestReport {
        let (mut report, selection) = {
            let mut state = self.state.write().await;
            let report = state.registry.ingest(files);
            if report.rejected > 0 {
                state.message = Some(StatusMessage::error(REJECTED_FILES_MESSAGE));
            }
            (report, state.format.map(|format| (format, state.quality)))
        };

        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            "files submitted"
        );

        if report.accepted > 0 {
            self.emit(Event::FilesAdded {
                ids: report.ids.clone(),
            });
        }
        if report.rejected > 0 {
            self.emit(Event::FilesRejected {
                names: report
                    .rejected_files
                    .iter()
                    .map(|file| file.name.clone())
                    .collect(),
            });
        }

        if let Some((format, quality)) = selection.filter(|_| report.accepted > 0) {
            debug!(%format, "format already selected, converting new files");
            report.conversion = Some(
                self.convert_all(format, quality.unwrap_or(Quality::FULL))
                    .await,
            );
        }

        report
    }

    /// Read files from disk and add them to the session
    ///
    /// The declared type of each file is taken from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if any path cannot be read; nothing is
    /// added in that case.
    pub async fn add_paths(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(SourceFile::from_path(path).await?);
        }
        Ok(self.add_files(files).await)
    }

    /// Remove one entry and its converted output
    ///
    /// Returns false if the id is unknown or was already removed. Removing the last
    /// entry resets the session: the format and quality selection and the status
    /// line are cleared and any pending quality-change batch is cancelled.
    pub async fn remove(&self, id: EntryId) -> bool {
        let (removed, emptied) = {
            let mut state = self.state.write().await;
            let removed = state.registry.remove(id);
            let emptied = removed && state.registry.is_empty();
            if emptied {
                state.reset();
            }
            (removed, emptied)
        };

        if !removed {
            debug!(entry_id = id.0, "remove ignored, entry not active");
            return false;
        }

        info!(entry_id = id.0, "entry removed");
        self.emit(Event::Removed { id });

        if emptied {
            self.debouncer.cancel().await;
            info!("last entry removed, session reset");
            self.emit(Event::Cleared);
        }
        true
    }

    /// Remove every entry and reset the session
    ///
    /// A batch still running is retired: its remaining results are discarded.
    pub async fn clear_all(&self) {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.registry.len();
            state.reset();
            removed
        };
        self.debouncer.cancel().await;

        if removed == 0 {
            debug!("clear requested on an empty session");
        } else {
            info!(removed, "session cleared");
        }
        self.emit(Event::Cleared);
    }
}
