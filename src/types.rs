//! Core types for image-converter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConversionError, Error, Result};

/// MIME types accepted at ingestion
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Stable identifier of a registry entry, assigned in ingestion order
///
/// Ids increase monotonically and are never reused by the same converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Create a new EntryId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Token identifying one conversion batch
///
/// Only the most recent batch may write results into the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl BatchId {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output format of a conversion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// PNG, lossless; quality is ignored
    Png,
    /// JPEG, lossy
    Jpeg,
    /// WebP, lossy
    Webp,
}

impl TargetFormat {
    /// All selectable formats
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Png, TargetFormat::Jpeg, TargetFormat::Webp];

    /// Canonical file extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Webp => "webp",
        }
    }

    /// MIME type of the encoded output
    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Webp => "image/webp",
        }
    }

    /// Whether the encoder takes a quality parameter
    pub fn is_lossy(&self) -> bool {
        matches!(self, TargetFormat::Jpeg | TargetFormat::Webp)
    }

    /// Upper-case label used in status messages ("WEBP")
    pub fn label(&self) -> String {
        self.extension().to_ascii_uppercase()
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "webp" => Ok(TargetFormat::Webp),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Encoder quality in percent (0..=100)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Full fidelity, used for lossless formats
    pub const FULL: Quality = Quality(100);

    /// Create a quality value, rejecting anything above 100
    pub fn new(percent: u32) -> Result<Self> {
        if percent > 100 {
            return Err(Error::InvalidQuality(percent));
        }
        Ok(Self(percent as u8))
    }

    pub(crate) const fn saturating(percent: u8) -> Self {
        if percent > 100 { Self(100) } else { Self(percent) }
    }

    /// Quality in percent
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Quality {
    type Error = Error;

    fn try_from(percent: u32) -> Result<Self> {
        Quality::new(percent)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// An original file submitted by the user
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Original file name
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Size of the original content in bytes
    pub size_bytes: u64,
    /// Original content
    pub bytes: Arc<[u8]>,
    /// When the file was created
    pub added_at: DateTime<Utc>,
}

impl SourceFile {
    /// Create a source file from its name, declared MIME type and content
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            bytes,
            added_at: Utc::now(),
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension
    ///
    /// Files with an unknown extension are declared as `application/octet-stream`
    /// and will be rejected at ingestion.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io_at(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = crate::utils::mime_for_path(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime_type, bytes))
    }

    /// Check the declared type against [`ACCEPTED_MIME_TYPES`]
    pub fn check_type(&self) -> Result<()> {
        if ACCEPTED_MIME_TYPES.contains(&self.mime_type.as_str()) {
            Ok(())
        } else {
            Err(Error::UnsupportedInputType {
                name: self.name.clone(),
                mime_type: self.mime_type.clone(),
            })
        }
    }
}

/// The encoded result of converting one source file
#[derive(Clone, Debug)]
pub struct ConvertedFile {
    /// Suggested file name (`<original base>.<target extension>`)
    pub name: String,
    /// Format the bytes are encoded in
    pub format: TargetFormat,
    /// Encoded content
    pub bytes: Arc<[u8]>,
}

impl ConvertedFile {
    /// Size of the encoded content in bytes
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Write the file into `dir` under its suggested name and return the written path
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| Error::io_at(&path, e))?;
        Ok(path)
    }
}

/// Conversion status of a registry entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryStatus {
    /// No format selected yet
    Pending,
    /// Conversion in progress
    Converting,
    /// Converted output is available
    Converted,
    /// Last conversion failed
    Failed {
        /// Why the conversion failed
        reason: String,
    },
}

impl EntryStatus {
    pub(crate) fn failed(error: &ConversionError) -> Self {
        EntryStatus::Failed {
            reason: error.to_string(),
        }
    }
}

/// Result of one conversion batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Entries the batch tried to convert
    pub attempted: usize,
    /// Entries converted successfully
    pub succeeded: usize,
    /// Entries that failed
    pub failed: usize,
}

impl Summary {
    /// Caller-visible outcome of this batch
    pub fn outcome(&self) -> Outcome {
        if self.attempted == 0 {
            Outcome::Idle
        } else if self.succeeded == self.attempted {
            Outcome::FullSuccess
        } else if self.succeeded == 0 {
            Outcome::TotalFailure
        } else {
            Outcome::PartialSuccess {
                failed: self.failed,
            }
        }
    }
}

/// How a batch turned out, from the user's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Every entry converted
    FullSuccess,
    /// Some entries failed
    PartialSuccess {
        /// Number of failed entries
        failed: usize,
    },
    /// Every entry failed
    TotalFailure,
    /// Nothing was attempted
    Idle,
}

impl Outcome {
    /// Status line for this outcome; `None` for [`Outcome::Idle`]
    pub fn message(&self) -> Option<StatusMessage> {
        match self {
            Outcome::FullSuccess => Some(StatusMessage::success(
                "Conversion complete! Ready to download.",
            )),
            Outcome::PartialSuccess { failed } => Some(StatusMessage::error(format!(
                "Completed with {failed} error(s)."
            ))),
            Outcome::TotalFailure => Some(StatusMessage::error("Conversion failed for all images.")),
            Outcome::Idle => None,
        }
    }
}

/// Kind of a status line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Informational or success
    Success,
    /// Something went wrong
    Error,
}

/// The single human-readable status line of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Message text
    pub text: String,
    /// Message kind
    pub kind: MessageKind,
}

impl StatusMessage {
    /// Success/info message
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
        }
    }

    /// Error message
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Error,
        }
    }
}

/// A file refused at ingestion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedFile {
    /// File name
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
}

/// Result of one ingestion batch
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of files stored
    pub accepted: usize,
    /// Number of files refused
    pub rejected: usize,
    /// Ids of the stored files, in submission order
    pub ids: Vec<EntryId>,
    /// The refused files
    pub rejected_files: Vec<RejectedFile>,
    /// Summary of the batch run because a format was already selected
    pub conversion: Option<Summary>,
}

impl IngestReport {
    /// Total files submitted
    pub fn submitted(&self) -> usize {
        self.accepted + self.rejected
    }
}

/// A ZIP archive of every converted file
#[derive(Clone, Debug)]
pub struct Bundle {
    /// Suggested file name
    pub file_name: String,
    /// Archive content
    pub bytes: Vec<u8>,
    /// Number of files inside
    pub entry_count: usize,
}

impl Bundle {
    /// Write the archive into `dir` and return the written path
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| Error::io_at(&path, e))?;
        Ok(path)
    }
}

/// Display row for one active entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryView {
    /// Entry id
    pub id: EntryId,
    /// Full original name
    pub name: String,
    /// Truncated original name for display
    pub display_name: String,
    /// Human-readable original size
    pub display_size: String,
    /// When the file was added to the session
    pub added_at: DateTime<Utc>,
    /// Conversion status
    pub status: EntryStatus,
    /// Output name, when converted
    pub output_name: Option<String>,
    /// Human-readable output size, when converted
    pub output_size: Option<String>,
}

/// Point-in-time view of a whole session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Active entries in insertion order
    pub entries: Vec<EntryView>,
    /// Selected target format
    pub format: Option<TargetFormat>,
    /// Selected quality
    pub quality: Option<Quality>,
    /// Current status line
    pub message: Option<StatusMessage>,
    /// Whether the download-all control should be offered
    pub can_download_all: bool,
}

/// Event emitted by the converter
///
/// Subscribe with [`ImageConverter::subscribe`](crate::ImageConverter::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Files stored in the registry
    FilesAdded {
        /// New entry ids
        ids: Vec<EntryId>,
    },

    /// Files refused at ingestion
    FilesRejected {
        /// Names of the refused files
        names: Vec<String>,
    },

    /// Entry removed by the user
    Removed {
        /// Entry id
        id: EntryId,
    },

    /// Registry emptied and selection reset
    Cleared,

    /// Target format chosen
    FormatSelected {
        /// The format
        format: TargetFormat,
        /// Quality set alongside it (lossy formats only)
        quality: Option<Quality>,
    },

    /// Quality changed; a batch follows after the debounce delay
    QualityChanged {
        /// New quality
        quality: Quality,
    },

    /// Conversion batch started
    BatchStarted {
        /// Batch id
        batch: BatchId,
        /// Target format
        format: TargetFormat,
        /// Entries in the batch
        entries: usize,
    },

    /// One entry started converting
    Converting {
        /// Batch id
        batch: BatchId,
        /// Entry id
        id: EntryId,
    },

    /// One entry converted
    Converted {
        /// Batch id
        batch: BatchId,
        /// Entry id
        id: EntryId,
        /// Output file name
        name: String,
        /// Output size in bytes
        size_bytes: u64,
    },

    /// One entry failed to convert
    ConversionFailed {
        /// Batch id
        batch: BatchId,
        /// Entry id
        id: EntryId,
        /// Error message
        error: String,
    },

    /// Result from a superseded batch, or for a removed entry, was dropped
    StaleResultDiscarded {
        /// Batch id the result belonged to
        batch: BatchId,
        /// Entry id
        id: EntryId,
    },

    /// All entries of a batch settled
    BatchComplete {
        /// Batch id
        batch: BatchId,
        /// Batch counts
        summary: Summary,
        /// Whether a newer batch started while this one ran
        superseded: bool,
    },
}
