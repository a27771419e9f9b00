//! Image encoding pipeline for pixfit.
//!
//! This module provides functionality for:
//! - Encoding RGB surfaces to JPEG at a given quality
//! - Serializing the result as a base64 data URI ([`EncodedImage`])
//!
//! # Examples
//!
//! ```ignore
//! use pixfit_core::encode::{encode_jpeg, EncodedImage};
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 90).unwrap();
//! let uri = EncodedImage::from_jpeg_bytes(&jpeg_bytes);
//! println!("Encoded {} chars", uri.len());
//! ```

mod data_uri;
mod jpeg;

pub use data_uri::{DataUriError, EncodedImage, JPEG_MIME};
pub use jpeg::{encode_image_jpeg, encode_jpeg, EncodeError};
