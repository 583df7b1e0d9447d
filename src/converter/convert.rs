//! Batch conversion over every active entry

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ImageConverter;
use crate::error::ConversionError;
use crate::registry::WriteOutcome;
use crate::types::{
    BatchId, ConvertedFile, EntryId, Event, Quality, SourceFile, StatusMessage, Summary,
    TargetFormat,
};
use crate::utils::output_name;

impl ImageConverter {
    /// Convert every active entry to `format`
    ///
    /// Every existing output is dropped first, then each entry is decoded and
    /// re-encoded concurrently. A failing entry is marked failed and never stops the
    /// others; the returned [`Summary`] counts both. `quality` is ignored for
    /// lossless formats.
    ///
    /// The selection stored in the session is left untouched; use
    /// [`select_format`](Self::select_format) to change it.
    ///
    /// If another batch starts (or the session is cleared) while this one runs, this
    /// batch's remaining results are discarded and the status line is left to the
    /// newer batch.
    pub async fn convert_all(&self, format: TargetFormat, quality: Quality) -> Summary {
        let quality = if format.is_lossy() {
            quality
        } else {
            Quality::FULL
        };

        let (batch, jobs) = {
            let mut state = self.state.write().await;
            let (batch, jobs) = state.registry.begin_batch();
            if !jobs.is_empty() {
                state.message = Some(StatusMessage::success(format!(
                    "Converting to {}...",
                    format.label()
                )));
            }
            (batch, jobs)
        };

        if jobs.is_empty() {
            debug!(batch_id = batch.0, "no active entries, nothing to convert");
            return Summary::default();
        }

        info!(
            batch_id = batch.0,
            %format,
            %quality,
            entries = jobs.len(),
            "conversion batch started"
        );
        self.emit(Event::BatchStarted {
            batch,
            format,
            entries: jobs.len(),
        });

        let attempts = jobs
            .into_iter()
            .map(|(id, source)| self.convert_entry(batch, id, source, format, quality));
        let results = join_all(attempts).await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        let summary = Summary {
            attempted: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        };

        let superseded = {
            let mut state = self.state.write().await;
            let superseded = state.registry.current_batch() != batch;
            if !superseded {
                if let Some(message) = summary.outcome().message() {
                    state.message = Some(message);
                }
            }
            superseded
        };

        info!(
            batch_id = batch.0,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            superseded,
            "conversion batch complete"
        );
        self.emit(Event::BatchComplete {
            batch,
            summary,
            superseded,
        });

        summary
    }

    /// Convert one entry and record the result; returns whether the conversion succeeded
    async fn convert_entry(
        &self,
        batch: BatchId,
        id: EntryId,
        source: SourceFile,
        format: TargetFormat,
        quality: Quality,
    ) -> bool {
        // The semaphore is never closed, so acquire only fails if it is gone
        let _permit = match &self.concurrent_limit {
            Some(limit) => Arc::clone(limit).acquire_owned().await.ok(),
            None => None,
        };

        self.emit(Event::Converting { batch, id });
        debug!(batch_id = batch.0, entry_id = id.0, name = %source.name, "converting entry");

        let result = self.attempt(&source, format, quality).await;
        let succeeded = result.is_ok();

        match result {
            Ok(converted) => {
                let name = converted.name.clone();
                let size_bytes = converted.size_bytes();
                let outcome = self
                    .state
                    .write()
                    .await
                    .registry
                    .record_success(batch, id, converted);
                if outcome == WriteOutcome::Applied {
                    debug!(batch_id = batch.0, entry_id = id.0, %name, size = size_bytes, "entry converted");
                    self.emit(Event::Converted {
                        batch,
                        id,
                        name,
                        size_bytes,
                    });
                } else {
                    self.discard(batch, id, outcome);
                }
            }
            Err(e) => {
                let outcome = self
                    .state
                    .write()
                    .await
                    .registry
                    .record_failure(batch, id, &e);
                if outcome == WriteOutcome::Applied {
                    warn!(batch_id = batch.0, entry_id = id.0, error = %e, "conversion failed");
                    self.emit(Event::ConversionFailed {
                        batch,
                        id,
                        error: e.to_string(),
                    });
                } else {
                    self.discard(batch, id, outcome);
                }
            }
        }

        succeeded
    }

    /// Decode, encode and name one output
    async fn attempt(
        &self,
        source: &SourceFile,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<ConvertedFile, ConversionError> {
        let raster = self
            .codec
            .decode(&source.name, Arc::clone(&source.bytes))
            .await?;
        let bytes = self
            .codec
            .encode(&source.name, raster, format, quality)
            .await?;

        if bytes.is_empty() {
            return Err(ConversionError::EmptyOutput {
                name: source.name.clone(),
            });
        }

        Ok(ConvertedFile {
            name: output_name(&source.name, format),
            format,
            bytes: bytes.into(),
        })
    }

    fn discard(&self, batch: BatchId, id: EntryId, outcome: WriteOutcome) {
        warn!(
            batch_id = batch.0,
            entry_id = id.0,
            ?outcome,
            "discarding conversion result"
        );
        self.emit(Event::StaleResultDiscarded { batch, id });
    }
}
