//! WASM-compatible wrapper types for compression results.
//!
//! This module provides JavaScript-friendly types that wrap the core pixfit
//! types, handling the conversion between Rust and JavaScript representations.

use pixfit_core::{Compressed, EncodeAttempt, UploadStatus};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A compressed image for JavaScript.
///
/// The data URI can be assigned directly to an `<img>` element's `src` or
/// handed to whatever stores the image.
#[wasm_bindgen]
pub struct JsCompressed {
    data_uri: String,
    width: u32,
    height: u32,
    quality: f32,
    rescaled: bool,
    within_budget: bool,
    attempts: Vec<AttemptJs>,
}

/// One encode attempt in the shape JavaScript sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptJs {
    quality: f32,
    width: u32,
    height: u32,
    encoded_len: usize,
}

impl From<&EncodeAttempt> for AttemptJs {
    fn from(attempt: &EncodeAttempt) -> Self {
        Self {
            quality: attempt.quality.as_f32(),
            width: attempt.width,
            height: attempt.height,
            encoded_len: attempt.encoded_len,
        }
    }
}

#[wasm_bindgen]
impl JsCompressed {
    /// The `data:image/jpeg;base64,...` string.
    #[wasm_bindgen(getter)]
    pub fn data_uri(&self) -> String {
        self.data_uri.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Final quality on the 0.0-1.0 scale.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Length of the data URI, the figure checked against the budget.
    #[wasm_bindgen(getter)]
    pub fn encoded_len(&self) -> usize {
        self.data_uri.len()
    }

    /// Whether the one-off shrink pass ran.
    #[wasm_bindgen(getter)]
    pub fn rescaled(&self) -> bool {
        self.rescaled
    }

    #[wasm_bindgen(getter)]
    pub fn within_budget(&self) -> bool {
        self.within_budget
    }

    /// Number of encoder calls made.
    #[wasm_bindgen(getter)]
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Every encode attempt as `{ quality, width, height, encodedLen }` objects.
    pub fn attempts(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.attempts).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsCompressed {
    pub(crate) fn from_compressed(compressed: Compressed) -> Self {
        let within_budget = compressed.within_budget();
        Self {
            width: compressed.width,
            height: compressed.height,
            quality: compressed.quality.as_f32(),
            rescaled: compressed.rescaled,
            within_budget,
            attempts: compressed.attempts.iter().map(AttemptJs::from).collect(),
            data_uri: compressed.image.into_string(),
        }
    }
}

/// Lower-case name of a status, as exposed on `ImageUploader.status`.
pub(crate) fn status_name(status: &UploadStatus) -> &'static str {
    match status {
        UploadStatus::Idle => "idle",
        UploadStatus::Busy => "busy",
        UploadStatus::Error(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfit_core::{CompressOptions, Compressor, DecodedImage};

    fn compressed(width: u32, height: u32) -> Compressed {
        let source = DecodedImage::new(width, height, vec![90u8; (width * height * 3) as usize]);
        Compressor::new()
            .compress_decoded(&source, &CompressOptions::default())
            .unwrap()
    }

    #[test]
    fn test_from_compressed() {
        let js = JsCompressed::from_compressed(compressed(40, 30));

        assert_eq!(js.width(), 40);
        assert_eq!(js.height(), 30);
        assert!((js.quality() - 0.9).abs() < 1e-6);
        assert!(js.data_uri().starts_with("data:image/jpeg;base64,"));
        assert_eq!(js.encoded_len(), js.data_uri().len());
        assert_eq!(js.attempt_count(), 1);
        assert!(js.within_budget());
        assert!(!js.rescaled());
    }

    #[test]
    fn test_attempt_conversion() {
        let result = compressed(16, 16);
        let attempt = AttemptJs::from(&result.attempts[0]);

        assert_eq!(attempt.width, 16);
        assert_eq!(attempt.encoded_len, result.image.len());
    }

    #[test]
    fn test_status_name() {
        assert_eq!(status_name(&UploadStatus::Idle), "idle");
        assert_eq!(status_name(&UploadStatus::Busy), "busy");
        assert_eq!(status_name(&UploadStatus::Error("x".to_string())), "error");
    }
}
