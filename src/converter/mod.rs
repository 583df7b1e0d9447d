//! Conversion session split into focused submodules.
//!
//! The `ImageConverter` struct and its methods are organized by domain:
//! - [`ingest`] - Adding, removing and clearing files
//! - [`selection`] - Target format and quality selection
//! - [`convert`] - Batch conversion over every active entry
//! - [`bundle`] - ZIP bundling and saving of converted files
//! - [`snapshot`] - Display state for a front-end
//! - [`debounce`] - Delayed, coalescing trigger for quality changes

mod bundle;
mod convert;
mod debounce;
mod ingest;
mod selection;
mod snapshot;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore, broadcast};

use crate::archive::{ArchiveBuilder, ZipArchiveBuilder};
use crate::codec::{ImageCodec, ImageRsCodec};
use crate::config::Config;
use crate::error::Result;
use crate::registry::Registry;
use crate::types::{
    ConvertedFile, EntryId, EntryStatus, Event, Quality, StatusMessage, TargetFormat,
};

use self::debounce::Debouncer;

/// Mutable state of one session
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    /// Source files and their outputs
    pub(crate) registry: Registry,
    /// Selected target format
    pub(crate) format: Option<TargetFormat>,
    /// Selected quality (lossy formats only)
    pub(crate) quality: Option<Quality>,
    /// Current status line
    pub(crate) message: Option<StatusMessage>,
}

impl SessionState {
    /// Empty the registry and forget the selection and status line
    ///
    /// The registry keeps its id counter and retires the in-flight batch.
    pub(crate) fn reset(&mut self) {
        self.registry.clear();
        self.format = None;
        self.quality = None;
        self.message = None;
    }
}

/// Main converter instance (cloneable - all fields are Arc-wrapped)
///
/// One `ImageConverter` is one conversion session: a registry of source files, the
/// selected target format and quality, and a status line. Every operation takes
/// `&self`, so clones can be handed to tasks freely.
#[derive(Clone)]
pub struct ImageConverter {
    /// Session state (registry, selection, status line)
    pub(crate) state: Arc<RwLock<SessionState>>,
    /// Image decoding/encoding capability
    pub(crate) codec: Arc<dyn ImageCodec>,
    /// Archive bundling capability
    pub(crate) archiver: Arc<dyn ArchiveBuilder>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Pending quality-change trigger
    pub(crate) debouncer: Debouncer,
    /// Bound on in-flight conversions, when configured
    pub(crate) concurrent_limit: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for ImageConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConverter")
            .field("codec", &self.codec.name())
            .field("archiver", &self.archiver.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ImageConverter {
    /// Create a converter with the default `image`-crate codec and ZIP archiver
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` fails validation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use image_converter::{Config, ImageConverter, SourceFile, TargetFormat};
    /// use std::path::Path;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let converter = ImageConverter::new(Config::default())?;
    ///
    ///     let photo = SourceFile::from_path(Path::new("photo.png")).await?;
    ///     let report = converter.add_files(vec![photo]).await;
    ///     println!("accepted {} file(s)", report.accepted);
    ///
    ///     let summary = converter.select_format(TargetFormat::Webp).await?;
    ///     println!("{:?}", summary.outcome());
    ///
    ///     let bundle = converter.bundle().await?;
    ///     bundle.save_to(Path::new("out")).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        Self::with_capabilities(
            config,
            Arc::new(ImageRsCodec::new()),
            Arc::new(ZipArchiveBuilder::new()),
        )
    }

    /// Create a converter with custom codec and archive implementations
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` fails validation.
    pub fn with_capabilities(
        config: Config,
        codec: Arc<dyn ImageCodec>,
        archiver: Arc<dyn ArchiveBuilder>,
    ) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(config.event_channel_capacity);
        let concurrent_limit = config
            .max_concurrent_conversions
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let debouncer = Debouncer::new(config.quality_debounce);

        tracing::debug!(
            codec = codec.name(),
            archiver = archiver.name(),
            debounce_ms = config.quality_debounce.as_millis() as u64,
            "image converter created"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            codec,
            archiver,
            event_tx,
            config: Arc::new(config),
            debouncer,
            concurrent_limit,
        })
    }

    /// Subscribe to session events
    ///
    /// Each subscriber receives all events independently. A subscriber that falls
    /// behind by more than `event_channel_capacity` events gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Selected format and quality
    pub async fn selection(&self) -> (Option<TargetFormat>, Option<Quality>) {
        let state = self.state.read().await;
        (state.format, state.quality)
    }

    /// Current status line
    pub async fn message(&self) -> Option<StatusMessage> {
        self.state.read().await.message.clone()
    }

    /// Converted output of one entry, if it has one
    pub async fn converted(&self, id: EntryId) -> Option<ConvertedFile> {
        self.state
            .read()
            .await
            .registry
            .get(id)
            .and_then(|entry| entry.converted.clone())
    }

    /// Conversion status of one entry, `None` if the id is not active
    pub async fn entry_status(&self, id: EntryId) -> Option<EntryStatus> {
        self.state
            .read()
            .await
            .registry
            .get(id)
            .map(|entry| entry.status.clone())
    }

    /// Ids of the active entries in insertion order
    pub async fn active_ids(&self) -> Vec<EntryId> {
        self.state.read().await.registry.active_ids().collect()
    }

    /// Broadcast an event; having no subscriber is not an error
    pub(crate) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
