//! Configuration types for image-converter

use crate::error::{Error, Result};
use crate::types::Quality;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for [`ImageConverter`](crate::ImageConverter)
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Delay after the last quality change before a new batch starts (default: 250ms)
    ///
    /// Serialized as milliseconds.
    #[serde(default = "default_quality_debounce", with = "duration_ms_serde")]
    pub quality_debounce: Duration,

    /// Quality applied when JPEG is selected (default: 90)
    #[serde(default = "default_jpeg_quality")]
    pub default_jpeg_quality: Quality,

    /// Quality applied when WebP is selected (default: 80)
    #[serde(default = "default_webp_quality")]
    pub default_webp_quality: Quality,

    /// File name of the bundle produced by `bundle()` (default: "converted_images.zip")
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Maximum conversions running at once (None = all entries at once)
    ///
    /// The batch still waits for every entry; this only bounds how many decode/encode
    /// jobs occupy the blocking pool simultaneously.
    #[serde(default)]
    pub max_concurrent_conversions: Option<usize>,

    /// Capacity of the event broadcast channel (default: 1024)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Maximum base-name length shown in entry views before truncation (default: 7)
    #[serde(default = "default_display_name_max_len")]
    pub display_name_max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality_debounce: default_quality_debounce(),
            default_jpeg_quality: default_jpeg_quality(),
            default_webp_quality: default_webp_quality(),
            archive_name: default_archive_name(),
            max_concurrent_conversions: None,
            event_channel_capacity: default_event_channel_capacity(),
            display_name_max_len: default_display_name_max_len(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their defaults. The loaded configuration is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or fails
    /// [`Config::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.archive_name.trim().is_empty() {
            return Err(Error::config("archive_name", "archive name must not be empty"));
        }
        if self.archive_name.contains(['/', '\\']) {
            return Err(Error::config(
                "archive_name",
                "archive name must be a bare file name",
            ));
        }
        if self.max_concurrent_conversions == Some(0) {
            return Err(Error::config(
                "max_concurrent_conversions",
                "must be at least 1 when set",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config(
                "event_channel_capacity",
                "event channel capacity must be at least 1",
            ));
        }
        if self.display_name_max_len == 0 {
            return Err(Error::config(
                "display_name_max_len",
                "display name length must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_quality_debounce() -> Duration {
    Duration::from_millis(250)
}

fn default_jpeg_quality() -> Quality {
    Quality::saturating(90)
}

fn default_webp_quality() -> Quality {
    Quality::saturating(80)
}

fn default_archive_name() -> String {
    "converted_images.zip".to_string()
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_display_name_max_len() -> usize {
    7
}

mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
