//! Target format and quality selection

use tracing::{debug, info};

use super::ImageConverter;
use crate::error::{Error, Result};
use crate::types::{Event, Quality, Summary, TargetFormat};

impl ImageConverter {
    /// Select the target format and convert every active entry to it
    ///
    /// The quality is reset to the format's default (`default_jpeg_quality` for
    /// JPEG, `default_webp_quality` for WebP, none for PNG). A quality change that
    /// has not fired yet is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveFiles`] if the session holds no file; the selection
    /// is left unchanged.
    pub async fn select_format(&self, format: TargetFormat) -> Result<Summary> {
        let quality = self.default_quality(format);
        {
            let mut state = self.state.write().await;
            if state.registry.is_empty() {
                return Err(Error::NoActiveFiles);
            }
            state.format = Some(format);
            state.quality = quality;
            // Emitted under the lock so it cannot trail a concurrent reset's Cleared
            self.emit(Event::FormatSelected { format, quality });
        }
        self.debouncer.cancel().await;

        info!(%format, quality = ?quality.map(|q| q.value()), "target format selected");

        Ok(self
            .convert_all(format, quality.unwrap_or(Quality::FULL))
            .await)
    }

    /// Change the quality of the selected lossy format
    ///
    /// The new batch starts once `quality_debounce` has passed without another
    /// change, so dragging a slider converts once at the end. This returns as soon
    /// as the change is stored; watch for [`Event::BatchComplete`] to learn the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuality`] if `percent` is above 100
    /// - [`Error::NoFormatSelected`] if no format has been selected
    /// - [`Error::QualityNotApplicable`] if the selected format is lossless
    ///
    /// The stored quality is unchanged on error.
    pub async fn set_quality(&self, percent: u32) -> Result<()> {
        let quality = Quality::new(percent)?;
        {
            let mut state = self.state.write().await;
            let format = state.format.ok_or(Error::NoFormatSelected)?;
            if !format.is_lossy() {
                return Err(Error::QualityNotApplicable(format.to_string()));
            }
            state.quality = Some(quality);
        }

        debug!(%quality, "quality changed, scheduling conversion");
        self.emit(Event::QualityChanged { quality });

        let converter = self.clone();
        self.debouncer
            .schedule(async move {
                let _ = converter.convert_selected().await;
            })
            .await;
        Ok(())
    }

    /// Convert every active entry with the selection as it is right now
    ///
    /// Returns an empty summary when no format is selected or no file is active.
    pub async fn convert_selected(&self) -> Summary {
        let (format, quality) = self.selection().await;
        match format {
            Some(format) => {
                self.convert_all(format, quality.unwrap_or(Quality::FULL))
                    .await
            }
            None => {
                debug!("no format selected, nothing to convert");
                Summary::default()
            }
        }
    }

    /// Quality set when `format` is selected
    pub fn default_quality(&self, format: TargetFormat) -> Option<Quality> {
        match format {
            TargetFormat::Jpeg => Some(self.config.default_jpeg_quality),
            TargetFormat::Webp => Some(self.config.default_webp_quality),
            TargetFormat::Png => None,
        }
    }
}
