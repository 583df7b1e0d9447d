//! Display state for a front-end

use super::ImageConverter;
use crate::types::{EntryView, SessionSnapshot};
use crate::utils::{format_bytes, truncate_filename};

impl ImageConverter {
    /// Point-in-time view of the session, ready to render
    ///
    /// `can_download_all` is true as soon as one entry has a converted output.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        let max_len = self.config.display_name_max_len;

        let entries = state
            .registry
            .entries()
            .map(|entry| EntryView {
                id: entry.id,
                name: entry.source.name.clone(),
                display_name: truncate_filename(&entry.source.name, max_len),
                display_size: format_bytes(entry.source.size_bytes, 2),
                added_at: entry.source.added_at,
                status: entry.status.clone(),
                output_name: entry.converted.as_ref().map(|c| c.name.clone()),
                output_size: entry
                    .converted
                    .as_ref()
                    .map(|c| format_bytes(c.size_bytes(), 2)),
            })
            .collect();

        SessionSnapshot {
            entries,
            format: state.format,
            quality: state.quality,
            message: state.message.clone(),
            can_download_all: state.registry.converted_count() > 0,
        }
    }
}
