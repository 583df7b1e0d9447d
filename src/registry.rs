//! File registry
//!
//! Holds the submitted source files and their converted outputs in a single ordered
//! map keyed by [`EntryId`]. Because a converted file lives inside its entry,
//! removing an entry always removes its output too.
//!
//! The registry also owns the current [`BatchId`]. Starting a batch advances it, and
//! results are only written when they carry the current id, so a slow batch that
//! has been superseded can never overwrite the output of a newer one.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::types::{
    BatchId, ConvertedFile, EntryId, EntryStatus, IngestReport, RejectedFile, SourceFile,
};

/// A source file together with its (optional) converted output
#[derive(Clone, Debug)]
pub struct Entry {
    /// Entry id
    pub id: EntryId,
    /// Original file
    pub source: SourceFile,
    /// Output of the last successful conversion in the current batch
    pub converted: Option<ConvertedFile>,
    /// Conversion status
    pub status: EntryStatus,
}

/// Outcome of writing a conversion result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The result was stored
    Applied,
    /// The result belongs to a superseded batch and was dropped
    Stale,
    /// The entry was removed while it was converting; the result was dropped
    Removed,
}

/// Ordered collection of entries
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<EntryId, Entry>,
    next_id: u64,
    current_batch: BatchId,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every file with an accepted type; refuse the rest
    ///
    /// `accepted + rejected` always equals the number of submitted files.
    pub fn ingest(&mut self, files: impl IntoIterator<Item = SourceFile>) -> IngestReport {
        let mut report = IngestReport::default();

        for file in files {
            if let Err(e) = file.check_type() {
                warn!(error = %e, "rejecting file");
                report.rejected += 1;
                report.rejected_files.push(RejectedFile {
                    name: file.name,
                    mime_type: file.mime_type,
                });
                continue;
            }

            let id = EntryId(self.next_id);
            self.next_id += 1;
            debug!(entry_id = id.0, name = %file.name, size = file.size_bytes, "file added");
            self.entries.insert(
                id,
                Entry {
                    id,
                    source: file,
                    converted: None,
                    status: EntryStatus::Pending,
                },
            );
            report.accepted += 1;
            report.ids.push(id);
        }

        report
    }

    /// Remove an entry and its output
    ///
    /// Returns false if the id is unknown or already removed.
    pub fn remove(&mut self, id: EntryId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Ids of live entries in insertion order
    ///
    /// The iterator is lazy; call again to restart from the first entry.
    pub fn active_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.keys().copied()
    }

    /// Live entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.values()
    }

    /// Look up one entry
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is live
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converted outputs in insertion order, skipping entries without one
    pub fn converted(&self) -> impl Iterator<Item = (EntryId, &ConvertedFile)> + '_ {
        self.entries
            .values()
            .filter_map(|entry| entry.converted.as_ref().map(|c| (entry.id, c)))
    }

    /// Number of entries with a converted output
    pub fn converted_count(&self) -> usize {
        self.converted().count()
    }

    /// Drop every entry and retire the current batch
    ///
    /// Ids keep increasing after a clear.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_batch = self.current_batch.next();
    }

    /// The batch allowed to write results
    pub fn current_batch(&self) -> BatchId {
        self.current_batch
    }

    /// Start a new batch over every live entry
    ///
    /// Clears all outputs, marks every entry as converting and returns the new batch
    /// id with a snapshot of the sources to convert.
    pub fn begin_batch(&mut self) -> (BatchId, Vec<(EntryId, SourceFile)>) {
        self.current_batch = self.current_batch.next();
        let jobs = self
            .entries
            .values_mut()
            .map(|entry| {
                entry.converted = None;
                entry.status = EntryStatus::Converting;
                (entry.id, entry.source.clone())
            })
            .collect();
        (self.current_batch, jobs)
    }

    /// Store a successful conversion
    pub fn record_success(
        &mut self,
        batch: BatchId,
        id: EntryId,
        converted: ConvertedFile,
    ) -> WriteOutcome {
        self.record(batch, id, |entry| {
            entry.converted = Some(converted);
            entry.status = EntryStatus::Converted;
        })
    }

    /// Record a failed conversion; the entry's output stays absent
    pub fn record_failure(
        &mut self,
        batch: BatchId,
        id: EntryId,
        error: &ConversionError,
    ) -> WriteOutcome {
        self.record(batch, id, |entry| {
            entry.converted = None;
            entry.status = EntryStatus::failed(error);
        })
    }

    fn record(
        &mut self,
        batch: BatchId,
        id: EntryId,
        apply: impl FnOnce(&mut Entry),
    ) -> WriteOutcome {
        if batch != self.current_batch {
            return WriteOutcome::Stale;
        }
        match self.entries.get_mut(&id) {
            Some(entry) => {
                apply(entry);
                WriteOutcome::Applied
            }
            None => WriteOutcome::Removed,
        }
    }
}
