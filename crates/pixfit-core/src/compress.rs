//! Budget-driven image compression.
//!
//! Decodes an arbitrary image, caps its width, then re-encodes as JPEG at
//! decreasing quality until the data URI fits the byte budget. If the
//! quality floor is reached and the result is still too large, the surface
//! is shrunk once by `sqrt(budget / size)` and encoded a final time at a
//! fixed quality.
//!
//! Quality stepping only re-encodes, while shrinking needs a full resample,
//! so the work is bounded to at most two resamples and eleven encodes.
//!
//! # Examples
//!
//! ```ignore
//! use pixfit_core::compress::{compress, CompressOptions};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let result = compress(&bytes, &CompressOptions::default()).unwrap();
//! println!("{}x{} at q{}", result.width, result.height, result.quality);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::{
    decode_image, resize, scale_to_max_width, scaled_dimensions, DecodeError, DecodedImage,
    FilterType,
};
use crate::encode::{encode_image_jpeg, EncodeError, EncodedImage};

/// Default byte budget in KiB.
pub const DEFAULT_MAX_SIZE_KB: u32 = 500;

/// Default maximum output width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Lossy codec quality, held in tenths so stepping never drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    /// First quality tried.
    pub const INITIAL: Quality = Quality(9);
    /// The quality loop stops here.
    pub const FLOOR: Quality = Quality(1);
    /// Fixed quality of the single rescale pass.
    pub const FALLBACK: Quality = Quality(8);

    /// Quality from tenths, valid for 1..=10.
    pub fn from_tenths(tenths: u8) -> Option<Self> {
        (1..=10).contains(&tenths).then_some(Quality(tenths))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    /// Quality on the 0.0-1.0 scale.
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 10.0
    }

    /// Equivalent quality on the JPEG encoder's 1-100 scale.
    pub fn to_jpeg_quality(self) -> u8 {
        self.0 * 10
    }

    /// The next quality down, or `None` once the floor is reached.
    pub fn step_down(self) -> Option<Quality> {
        (self > Self::FLOOR).then(|| Quality(self.0 - 1))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f32())
    }
}

/// Constraints applied to every compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressOptions {
    /// Maximum output width in pixels.
    pub max_width: u32,
    /// Byte budget in KiB.
    #[serde(rename = "maxSizeKB")]
    pub max_size_kb: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_size_kb: DEFAULT_MAX_SIZE_KB,
        }
    }
}

impl CompressOptions {
    pub fn new(max_width: u32, max_size_kb: u32) -> Self {
        Self {
            max_width,
            max_size_kb,
        }
    }

    /// Budget in bytes, compared against the data URI length. Saturates on
    /// 32-bit targets.
    pub fn max_bytes(&self) -> usize {
        usize::try_from(self.max_size_kb)
            .unwrap_or(usize::MAX)
            .saturating_mul(1024)
    }

    pub fn validate(&self) -> Result<(), CompressError> {
        if self.max_width == 0 || self.max_size_kb == 0 {
            return Err(CompressError::InvalidOptions {
                max_width: self.max_width,
                max_size_kb: self.max_size_kb,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during compression.
///
/// Exceeding the budget is not an error; see [`Compressed::within_budget`].
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Invalid compression options: max width {max_width}px, max size {max_size_kb}KB")]
    InvalidOptions { max_width: u32, max_size_kb: u32 },

    #[error("Could not decode image: {0}")]
    Decode(#[from] DecodeError),

    #[error("Could not encode image: {0}")]
    Encode(#[from] EncodeError),
}

impl CompressError {
    /// True when the input itself could not be read as an image.
    pub fn is_decode(&self) -> bool {
        matches!(self, CompressError::Decode(_))
    }
}

/// A lossy codec producing self-describing encoded images.
pub trait LossyEncoder {
    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<EncodedImage, EncodeError>;
}

impl<F> LossyEncoder for F
where
    F: Fn(&DecodedImage, Quality) -> Result<EncodedImage, EncodeError>,
{
    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<EncodedImage, EncodeError> {
        self(image, quality)
    }
}

/// JPEG wrapped in a `data:image/jpeg;base64,` URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegDataUriEncoder;

impl LossyEncoder for JpegDataUriEncoder {
    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<EncodedImage, EncodeError> {
        let jpeg = encode_image_jpeg(image, quality.to_jpeg_quality())?;
        Ok(EncodedImage::from_jpeg_bytes(&jpeg))
    }
}

/// One call into the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeAttempt {
    pub quality: Quality,
    pub width: u32,
    pub height: u32,
    pub encoded_len: usize,
}

/// Result of a compression run.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub image: EncodedImage,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Every encode in call order.
    pub attempts: Vec<EncodeAttempt>,
    /// Whether the single shrink pass ran.
    pub rescaled: bool,
    max_bytes: usize,
}

impl Compressed {
    /// False only when even the shrink pass overshot the budget.
    pub fn within_budget(&self) -> bool {
        self.image.len() <= self.max_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn into_image(self) -> EncodedImage {
        self.image
    }
}

/// Runs the decode, cap, quality-step, shrink pipeline with a pluggable encoder.
#[derive(Debug, Clone)]
pub struct Compressor<E = JpegDataUriEncoder> {
    encoder: E,
    filter: FilterType,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor {
    pub fn new() -> Self {
        Self::with_encoder(JpegDataUriEncoder)
    }
}

impl<E: LossyEncoder> Compressor<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self {
            encoder,
            filter: FilterType::Bilinear,
        }
    }

    /// Resampling filter for both the width cap and the shrink pass.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Decode `input` and compress it to fit `options`.
    pub fn compress(
        &self,
        input: &[u8],
        options: &CompressOptions,
    ) -> Result<Compressed, CompressError> {
        options.validate()?;
        let source = decode_image(input)?;
        debug!(
            width = source.width,
            height = source.height,
            input_len = input.len(),
            "decoded image"
        );
        self.compress_decoded(&source, options)
    }

    /// Compress an already decoded surface.
    pub fn compress_decoded(
        &self,
        source: &DecodedImage,
        options: &CompressOptions,
    ) -> Result<Compressed, CompressError> {
        options.validate()?;
        let max_bytes = options.max_bytes();
        let mut attempts = Vec::new();

        let surface = scale_to_max_width(source, options.max_width, self.filter)?;

        let mut quality = Quality::INITIAL;
        let mut encoded = self.encode_attempt(&surface, quality, &mut attempts)?;

        while encoded.len() > max_bytes {
            let Some(next) = quality.step_down() else {
                break;
            };
            quality = next;
            encoded = self.encode_attempt(&surface, quality, &mut attempts)?;
        }

        let (mut width, mut height) = (surface.width, surface.height);
        let mut rescaled = false;

        if encoded.len() > max_bytes {
            let factor = (max_bytes as f64 / encoded.len() as f64).sqrt();
            let (new_width, new_height) = scaled_dimensions(surface.width, surface.height, factor);
            debug!(
                factor,
                from = ?(surface.width, surface.height),
                to = ?(new_width, new_height),
                "quality floor reached, shrinking"
            );

            let shrunk = resize(source, new_width, new_height, self.filter)?;

            quality = Quality::FALLBACK;
            encoded = self.encode_attempt(&shrunk, quality, &mut attempts)?;
            (width, height) = (new_width, new_height);
            rescaled = true;

            if encoded.len() > max_bytes {
                warn!(
                    encoded_len = encoded.len(),
                    max_bytes, "image still exceeds budget after shrinking"
                );
            }
        }

        Ok(Compressed {
            image: encoded,
            width,
            height,
            quality,
            attempts,
            rescaled,
            max_bytes,
        })
    }

    fn encode_attempt(
        &self,
        surface: &DecodedImage,
        quality: Quality,
        attempts: &mut Vec<EncodeAttempt>,
    ) -> Result<EncodedImage, EncodeError> {
        let encoded = self.encoder.encode(surface, quality)?;
        debug!(
            quality = quality.as_f32(),
            width = surface.width,
            height = surface.height,
            encoded_len = encoded.len(),
            "encoded"
        );
        attempts.push(EncodeAttempt {
            quality,
            width: surface.width,
            height: surface.height,
            encoded_len: encoded.len(),
        });
        Ok(encoded)
    }
}

/// Compress `input` with the default JPEG encoder.
pub fn compress(input: &[u8], options: &CompressOptions) -> Result<Compressed, CompressError> {
    Compressor::new().compress(input, options)
}
