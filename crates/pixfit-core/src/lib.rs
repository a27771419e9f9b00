//! pixfit Core - client-side image upload compression
//!
//! This crate decodes a user-selected image, caps its width, and re-encodes
//! it as a JPEG data URI that fits a byte budget. It also provides the
//! upload controller state machine that sits behind an image picker widget.
//!
//! - [`decode`] - decoding, EXIF orientation, resampling
//! - [`encode`] - JPEG encoding and data URI serialization
//! - [`compress`] - the budget-driven quality/size loop
//! - [`upload`] - selection validation and idle/busy/error state

pub mod compress;
pub mod decode;
pub mod encode;
pub mod upload;

pub use compress::{
    compress, CompressError, CompressOptions, Compressed, Compressor, EncodeAttempt,
    JpegDataUriEncoder, LossyEncoder, Quality,
};
pub use decode::{DecodeError, DecodedImage, FilterType};
pub use encode::{DataUriError, EncodeError, EncodedImage};
pub use upload::{
    is_image_mime, UploadConfig, UploadController, UploadError, UploadHost, UploadState,
    UploadStatus,
};
