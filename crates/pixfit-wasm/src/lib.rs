//! pixfit WASM - WebAssembly bindings for pixfit
//!
//! This crate exposes pixfit-core's compressor and upload controller to
//! JavaScript/TypeScript pages. Markup and styling stay on the page.
//!
//! # Module Structure
//!
//! - `compress` - one-shot compression to a JPEG data URI
//! - `uploader` - the `ImageUploader` widget state machine
//! - `types` - WASM-compatible wrapper types for results
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@pixfit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, 800, 500);
//! console.log(`${result.width}x${result.height}, ${result.encoded_len} chars`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;
mod uploader;

// Re-export public types
pub use compress::{compress_image, compress_image_with_options, data_uri_byte_length};
pub use types::JsCompressed;
pub use uploader::ImageUploader;

/// Module entry point, run once when the WASM module loads.
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check whether a declared MIME type is an image type (`image/*`).
#[wasm_bindgen]
pub fn is_image_mime(mime_type: &str) -> bool {
    pixfit_core::is_image_mime(mime_type)
}
