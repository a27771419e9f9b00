//! Upload controller: validates a selected file, runs the compressor, and
//! tracks the transient preview/busy/error state behind an upload widget.
//!
//! The controller never renders anything. It owns an [`UploadState`] and
//! reports results to an [`UploadHost`], which is where the page's
//! `onImageChange` callback and file input live.
//!
//! # State machine
//!
//! ```text
//!            begin_selection (image/*)            complete_selection Ok
//!   Idle ─────────────────────────────► Busy ─────────────────────────► Idle
//!   Error ───────────────────────────►   │   complete_selection Err
//!                                        └────────────────────────────► Error
//!   any ──── remove ───► Idle (preview cleared)
//! ```
//!
//! Selections arriving while busy are rejected, so at most one compression
//! is ever in flight.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compress::{
    CompressError, CompressOptions, Compressor, JpegDataUriEncoder, LossyEncoder,
    DEFAULT_MAX_SIZE_KB, DEFAULT_MAX_WIDTH,
};
use crate::encode::{DataUriError, EncodedImage};

/// Shown when the selected file is not an image.
pub const INVALID_TYPE_MESSAGE: &str = "Please select an image file";

/// Shown when decoding or encoding fails. Details go to the log only.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image";

/// Declared MIME types must start with this to be accepted.
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// True when `mime` names an image category type (`image/*`).
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..IMAGE_MIME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MIME_PREFIX))
}

/// Construction-time configuration of an upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    /// Image to preview before anything is selected, e.g. loaded from storage.
    pub current_image: Option<EncodedImage>,
    /// Display label. No behavioral effect.
    pub label: String,
    /// Byte budget in KiB.
    #[serde(rename = "maxSizeKB")]
    pub max_size_kb: u32,
    /// Maximum output width in pixels.
    pub max_width: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            current_image: None,
            label: "Image".to_string(),
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl UploadConfig {
    pub fn with_current_image(mut self, image: EncodedImage) -> Self {
        self.current_image = Some(image);
        self
    }

    /// Validate and set the initial preview from a stored data URI string.
    pub fn with_current_data_uri(self, uri: impl Into<String>) -> Result<Self, DataUriError> {
        Ok(self.with_current_image(EncodedImage::parse(uri)?))
    }

    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions::new(self.max_width, self.max_size_kb)
    }
}

/// Status flag of the widget. Busy and error are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Busy,
    Error(String),
}

/// Everything the widget renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    pub preview: Option<EncodedImage>,
    pub status: UploadStatus,
}

/// Errors returned to the caller of the controller. None of these reach the
/// host's `image_changed` hook.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {mime:?}")]
    InvalidType { mime: String },

    #[error("A file is already being processed")]
    Busy,

    #[error("No selection in progress")]
    NotStarted,

    #[error("Processing failed: {0}")]
    Processing(#[from] CompressError),
}

/// The embedding page: receives results and owns the file input.
///
/// Hooks run after the controller's state is updated.
pub trait UploadHost {
    /// Called with the new image after a successful compression, or `None`
    /// after an explicit removal.
    fn image_changed(&mut self, image: Option<&EncodedImage>);

    /// Clear the file input so the same file can be picked again.
    fn reset_file_selection(&mut self) {}
}

impl<F> UploadHost for F
where
    F: FnMut(Option<&EncodedImage>),
{
    fn image_changed(&mut self, image: Option<&EncodedImage>) {
        self(image)
    }
}

/// Drives one upload widget.
pub struct UploadController<H, E = JpegDataUriEncoder> {
    config: UploadConfig,
    compressor: Compressor<E>,
    state: UploadState,
    host: H,
}

impl<H: UploadHost> UploadController<H> {
    pub fn new(config: UploadConfig, host: H) -> Self {
        Self::with_compressor(config, Compressor::new(), host)
    }
}

impl<H: UploadHost, E: LossyEncoder> UploadController<H, E> {
    pub fn with_compressor(config: UploadConfig, compressor: Compressor<E>, host: H) -> Self {
        let state = UploadState {
            preview: config.current_image.clone(),
            status: UploadStatus::Idle,
        };
        Self {
            config,
            compressor,
            state,
            host,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn preview(&self) -> Option<&EncodedImage> {
        self.state.preview.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state.status {
            UploadStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.status == UploadStatus::Busy
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Validate, compress, and publish a selected file in one step.
    pub fn select_file(&mut self, bytes: &[u8], mime: &str) -> Result<(), UploadError> {
        self.begin_selection(mime)?;
        self.complete_selection(bytes)
    }

    /// First half of a selection: check the declared type and go busy.
    ///
    /// Use this with [`complete_selection`](Self::complete_selection) when
    /// the file bytes arrive asynchronously, so the widget can show busy
    /// while they are read.
    pub fn begin_selection(&mut self, mime: &str) -> Result<(), UploadError> {
        if self.is_busy() {
            debug!(mime, "selection ignored while busy");
            return Err(UploadError::Busy);
        }

        if !is_image_mime(mime) {
            info!(mime, "rejected non-image selection");
            self.state.status = UploadStatus::Error(INVALID_TYPE_MESSAGE.to_string());
            return Err(UploadError::InvalidType {
                mime: mime.to_string(),
            });
        }

        self.state.status = UploadStatus::Busy;
        Ok(())
    }

    /// Second half of a selection: compress `bytes` and publish the result.
    ///
    /// Busy is always cleared. On failure the previous preview is kept and the
    /// host is not called.
    pub fn complete_selection(&mut self, bytes: &[u8]) -> Result<(), UploadError> {
        if !self.is_busy() {
            return Err(UploadError::NotStarted);
        }

        match self
            .compressor
            .compress(bytes, &self.config.compress_options())
        {
            Ok(compressed) => {
                debug!(
                    width = compressed.width,
                    height = compressed.height,
                    quality = compressed.quality.as_f32(),
                    encoded_len = compressed.image.len(),
                    "image ready"
                );
                self.state.status = UploadStatus::Idle;
                let preview = self.state.preview.insert(compressed.into_image());
                self.host.image_changed(Some(preview));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "image processing failed");
                self.fail_selection();
                Err(UploadError::Processing(err))
            }
        }
    }

    /// Abandon an in-flight selection, e.g. when reading the file failed.
    pub fn fail_selection(&mut self) {
        self.state.status = UploadStatus::Error(PROCESSING_FAILED_MESSAGE.to_string());
    }

    /// Clear the preview, tell the host there is no image, and reset the input.
    pub fn remove(&mut self) {
        self.state = UploadState::default();
        self.host.image_changed(None);
        self.host.reset_file_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Quality;
    use crate::decode::DecodedImage;
    use crate::encode::EncodeError;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingHost {
        changes: Vec<Option<EncodedImage>>,
        resets: usize,
    }

    impl UploadHost for RecordingHost {
        fn image_changed(&mut self, image: Option<&EncodedImage>) {
            self.changes.push(image.cloned());
        }

        fn reset_file_selection(&mut self) {
            self.resets += 1;
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn stored_image() -> EncodedImage {
        EncodedImage::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9])
    }

    fn controller() -> UploadController<RecordingHost> {
        UploadController::new(UploadConfig::default(), RecordingHost::default())
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(is_image_mime("image/svg+xml"));
        assert!(!is_image_mime("application/pdf"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime("imag"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn test_initial_state_uses_current_image() {
        let config = UploadConfig::default().with_current_image(stored_image());
        let ctl = UploadController::new(config, RecordingHost::default());

        assert_eq!(ctl.preview(), Some(&stored_image()));
        assert_eq!(ctl.state().status, UploadStatus::Idle);
        assert!(ctl.host().changes.is_empty());
    }

    #[test]
    fn test_config_rejects_non_data_uri_current_image() {
        assert!(UploadConfig::default()
            .with_current_data_uri("/images/a.jpg")
            .is_err());
    }

    #[test]
    fn test_successful_selection_publishes_once() {
        let mut ctl = controller();

        ctl.select_file(&png_bytes(120, 80), "image/png").unwrap();

        let preview = ctl.preview().cloned().unwrap();
        assert!(preview.as_str().starts_with("data:image/jpeg;base64,"));
        assert_eq!(ctl.host().changes, vec![Some(preview)]);
        assert_eq!(ctl.state().status, UploadStatus::Idle);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_non_image_type_sets_error_without_callback() {
        let config = UploadConfig::default().with_current_image(stored_image());
        let mut ctl = UploadController::new(config, RecordingHost::default());

        let result = ctl.select_file(b"%PDF-1.4", "application/pdf");

        assert!(matches!(result, Err(UploadError::InvalidType { .. })));
        assert_eq!(ctl.error(), Some(INVALID_TYPE_MESSAGE));
        assert_eq!(ctl.preview(), Some(&stored_image()));
        assert!(ctl.host().changes.is_empty());
    }

    #[test]
    fn test_corrupt_image_sets_error_and_keeps_preview() {
        let mut ctl = controller();
        ctl.select_file(&png_bytes(16, 16), "image/png").unwrap();
        let before = ctl.preview().cloned();

        let result = ctl.select_file(b"\x89PNG\r\n\x1a\n garbage", "image/png");

        match result {
            Err(UploadError::Processing(err)) => assert!(err.is_decode()),
            other => panic!("expected decode failure, got {other:?}"),
        }
        assert_eq!(ctl.error(), Some(PROCESSING_FAILED_MESSAGE));
        assert!(!ctl.is_busy());
        assert_eq!(ctl.preview().cloned(), before);
        assert_eq!(ctl.host().changes.len(), 1);
    }

    #[test]
    fn test_valid_selection_clears_previous_error() {
        let mut ctl = controller();
        let _ = ctl.select_file(b"hello", "text/plain");
        assert!(ctl.error().is_some());

        ctl.select_file(&png_bytes(10, 10), "image/png").unwrap();
        assert_eq!(ctl.error(), None);
    }

    #[test]
    fn test_begin_selection_goes_busy_and_clears_error() {
        let mut ctl = controller();
        let _ = ctl.select_file(b"hello", "text/plain");

        ctl.begin_selection("image/png").unwrap();

        assert!(ctl.is_busy());
        assert_eq!(ctl.error(), None);
    }

    #[test]
    fn test_selection_rejected_while_busy() {
        let mut ctl = controller();
        ctl.begin_selection("image/png").unwrap();

        assert!(matches!(ctl.begin_selection("image/jpeg"), Err(UploadError::Busy)));
        assert!(matches!(ctl.select_file(b"x", "text/plain"), Err(UploadError::Busy)));
        assert!(ctl.is_busy());

        ctl.complete_selection(&png_bytes(8, 8)).unwrap();
        assert!(!ctl.is_busy());
        assert_eq!(ctl.host().changes.len(), 1);
    }

    #[test]
    fn test_complete_without_begin() {
        let mut ctl = controller();
        assert!(matches!(
            ctl.complete_selection(&png_bytes(8, 8)),
            Err(UploadError::NotStarted)
        ));
        assert!(ctl.host().changes.is_empty());
    }

    #[test]
    fn test_fail_selection_leaves_busy() {
        let mut ctl = controller();
        ctl.begin_selection("image/jpeg").unwrap();

        ctl.fail_selection();

        assert!(!ctl.is_busy());
        assert_eq!(ctl.error(), Some(PROCESSING_FAILED_MESSAGE));
    }

    #[test]
    fn test_remove_from_any_state() {
        // From a loaded preview.
        let config = UploadConfig::default().with_current_image(stored_image());
        let mut ctl = UploadController::new(config, RecordingHost::default());
        ctl.remove();
        assert_eq!(ctl.preview(), None);
        assert_eq!(ctl.host().changes, vec![None]);
        assert_eq!(ctl.host().resets, 1);

        // From an error.
        let _ = ctl.select_file(b"x", "text/plain");
        ctl.remove();
        assert_eq!(ctl.state(), &UploadState::default());

        // From busy.
        ctl.begin_selection("image/png").unwrap();
        ctl.remove();
        assert!(!ctl.is_busy());
        assert_eq!(ctl.host().changes, vec![None, None, None]);
        assert_eq!(ctl.host().resets, 3);
    }

    #[test]
    fn test_closure_host() {
        let mut seen = Vec::new();
        {
            let host = |image: Option<&EncodedImage>| seen.push(image.map(|i| i.len()));
            let mut ctl = UploadController::new(UploadConfig::default(), host);
            ctl.select_file(&png_bytes(20, 20), "image/png").unwrap();
            ctl.remove();
        }
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_some());
        assert_eq!(seen[1], None);
    }

    #[test]
    fn test_config_drives_compression() {
        let mut config = UploadConfig::default();
        config.max_width = 50;
        config.max_size_kb = 1;
        let encoder = |img: &DecodedImage, _: Quality| -> Result<EncodedImage, EncodeError> {
            assert!(img.width <= 50);
            Ok(EncodedImage::from_jpeg_bytes(&[0u8; 16]))
        };
        let mut ctl = UploadController::with_compressor(
            config,
            Compressor::with_encoder(encoder),
            RecordingHost::default(),
        );

        ctl.select_file(&png_bytes(200, 100), "image/png").unwrap();
        assert_eq!(ctl.host().changes.len(), 1);
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let config: UploadConfig = serde_json::from_str(
            r#"{"label":"Avatar","maxSizeKB":200,"currentImage":"data:image/jpeg;base64,/9j/2Q=="}"#,
        )
        .unwrap();

        assert_eq!(config.label, "Avatar");
        assert_eq!(config.max_size_kb, 200);
        assert_eq!(config.max_width, DEFAULT_MAX_WIDTH);
        assert_eq!(
            config.current_image.map(|i| i.mime_type().to_string()),
            Some("image/jpeg".to_string())
        );
    }

    #[test]
    fn test_config_rejects_bad_current_image() {
        let result: Result<UploadConfig, _> =
            serde_json::from_str(r#"{"currentImage":"/static/avatar.png"}"#);
        assert!(result.is_err());
    }
}
