//! Compression WASM bindings.
//!
//! Exposes the budget-driven compressor directly, for callers that want the
//! result without the upload controller's state tracking.
//!
//! # Example
//!
//! ```typescript
//! import { compress_image } from '@pixfit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, 800, 500);
//! img.src = result.data_uri;
//! ```

use crate::types::JsCompressed;
use pixfit_core::{compress, CompressOptions, EncodedImage};
use wasm_bindgen::prelude::*;

/// Compress image bytes to a JPEG data URI no longer than `max_size_kb` KiB.
///
/// # Arguments
///
/// * `bytes` - The file bytes (JPEG, PNG, GIF, WebP or BMP)
/// * `max_width` - Output width cap in pixels
/// * `max_size_kb` - Budget for the data URI length, in KiB
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded as an image, or if either
/// limit is zero. Running over budget is not an error; check `within_budget`.
#[wasm_bindgen]
pub fn compress_image(
    bytes: &[u8],
    max_width: u32,
    max_size_kb: u32,
) -> Result<JsCompressed, JsValue> {
    compress(bytes, &CompressOptions::new(max_width, max_size_kb))
        .map(JsCompressed::from_compressed)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compress with an options object `{ maxWidth?, maxSizeKB? }`.
///
/// Missing fields fall back to 800px and 500 KiB.
#[wasm_bindgen]
pub fn compress_image_with_options(
    bytes: &[u8],
    options: JsValue,
) -> Result<JsCompressed, JsValue> {
    let options: CompressOptions = if options.is_undefined() || options.is_null() {
        CompressOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid compress options: {}", e)))?
    };

    compress(bytes, &options)
        .map(JsCompressed::from_compressed)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decoded payload size in bytes of a base64 data URI.
#[wasm_bindgen]
pub fn data_uri_byte_length(uri: &str) -> Result<usize, JsValue> {
    EncodedImage::parse(uri)
        .map(|image| image.payload_len())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
