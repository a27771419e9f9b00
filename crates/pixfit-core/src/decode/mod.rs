//! Image decoding pipeline for pixfit.
//!
//! This module provides functionality for:
//! - Decoding user-selected images (JPEG, PNG, GIF, WebP, BMP)
//! - Applying EXIF orientation so the surface is upright
//! - Flattening transparency onto a white background
//! - Resampling to a maximum width or to exact dimensions
//!
//! # Architecture
//!
//! Everything here is synchronous and single-threaded so it runs unchanged
//! inside WASM. The decoded [`DecodedImage`] is the off-screen surface the
//! compressor renders into.
//!
//! # Examples
//!
//! ```ignore
//! use pixfit_core::decode::{decode_image, scale_to_max_width, FilterType};
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let fitted = scale_to_max_width(&image, 800, FilterType::Bilinear).unwrap();
//! println!("Fitted {}x{} image", fitted.width, fitted.height);
//! ```

mod reader;
mod resize;
mod types;

pub use reader::decode_image;
pub use resize::{fit_to_width_dimensions, resize, scale_to_max_width, scaled_dimensions};
pub use types::{DecodeError, DecodedImage, FilterType};
