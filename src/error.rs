//! Error types for image-converter
//!
//! This module provides error handling for the library, including:
//! - The top-level [`Error`] returned by session operations
//! - Per-file [`ConversionError`]s that are recorded on an entry instead of aborting a batch
//! - Stable machine-readable error codes for status reporting

use std::path::Path;
use thiserror::Error;

/// Result type alias for image-converter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-converter
///
/// None of these errors is fatal to a session: the converter stays usable after
/// every one of them.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "quality_debounce")
        key: Option<String>,
    },

    /// A submitted file's declared type is not one of the accepted input types
    #[error("unsupported input type {mime_type:?} for {name}")]
    UnsupportedInputType {
        /// Name of the rejected file
        name: String,
        /// The declared MIME type that was rejected
        mime_type: String,
    },

    /// Per-file conversion failure
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Bundling was requested while no converted file exists
    #[error("nothing to bundle: no successful conversions")]
    EmptyBundle,

    /// An operation that needs at least one active file was called on an empty registry
    #[error("no active files")]
    NoActiveFiles,

    /// Quality was set before any target format was selected
    #[error("no target format selected")]
    NoFormatSelected,

    /// Quality was set while a lossless format is selected
    #[error("quality does not apply to {0}")]
    QualityNotApplicable(String),

    /// Quality value outside 0..=100
    #[error("invalid quality {0}: must be between 0 and 100")]
    InvalidQuality(u32),

    /// Unknown target format name
    #[error("unknown target format: {0}")]
    UnknownFormat(String),

    /// Archive creation failed
    #[error("archive error: {0}")]
    Archive(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Background task panicked or was cancelled
    #[error("task error: {0}")]
    Task(String),
}

/// Per-file conversion errors
///
/// These are isolated to one entry: a batch records them on the entry's status and
/// keeps going with the remaining entries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// Source bytes could not be decoded into a raster
    #[error("failed to decode {name}: {reason}")]
    Decode {
        /// Source file name
        name: String,
        /// Decoder message
        reason: String,
    },

    /// Raster could not be encoded in the target format
    #[error("failed to encode {name} as {format}: {reason}")]
    Encode {
        /// Source file name
        name: String,
        /// Target format name
        format: String,
        /// Encoder message
        reason: String,
    },

    /// Encoder finished but produced no bytes
    #[error("encoder produced no output for {name}")]
    EmptyOutput {
        /// Source file name
        name: String,
    },
}

impl ConversionError {
    /// Machine-readable code for this conversion failure
    pub fn code(&self) -> &'static str {
        match self {
            ConversionError::Decode { .. } => "decode_error",
            ConversionError::Encode { .. } => "encode_error",
            ConversionError::EmptyOutput { .. } => "empty_output",
        }
    }
}

impl Error {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::UnsupportedInputType { .. } => "unsupported_input_type",
            Error::Conversion(e) => e.code(),
            Error::EmptyBundle => "empty_bundle",
            Error::NoActiveFiles => "no_active_files",
            Error::NoFormatSelected => "no_format_selected",
            Error::QualityNotApplicable(_) => "quality_not_applicable",
            Error::InvalidQuality(_) => "invalid_quality",
            Error::UnknownFormat(_) => "unknown_format",
            Error::Archive(_) => "archive_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Task(_) => "task_error",
        }
    }

    /// Create a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Wrap an I/O failure that happened while touching `path`
    pub(crate) fn io_at(path: &Path, e: std::io::Error) -> Self {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}
