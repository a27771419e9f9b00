//! Data URI serialization for encoded images.
//!
//! The compressor's output is a `data:image/jpeg;base64,...` string that can
//! be assigned straight to an `<img src>` and stored as an opaque value.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type of every image the compressor produces.
pub const JPEG_MIME: &str = "image/jpeg";

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Browsers accept data URIs with or without trailing `=` padding.
const PAYLOAD_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors from parsing a data URI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("Not a data URI")]
    MissingPrefix,

    #[error("Data URI is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// A compressed image serialized as a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap raw JPEG bytes as a `data:image/jpeg;base64,` URI.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self::from_bytes(JPEG_MIME, bytes)
    }

    /// Wrap raw bytes of the given MIME type as a base64 data URI.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let payload = STANDARD.encode(bytes);
        let mut uri =
            String::with_capacity(DATA_PREFIX.len() + mime.len() + BASE64_MARKER.len() + payload.len());
        uri.push_str(DATA_PREFIX);
        uri.push_str(mime);
        uri.push_str(BASE64_MARKER);
        uri.push_str(&payload);
        Self(uri)
    }

    /// Validate an externally supplied string (e.g. loaded from storage).
    ///
    /// The payload must be valid base64; padding is optional.
    pub fn parse(uri: impl Into<String>) -> Result<Self, DataUriError> {
        let uri = uri.into();
        let (_, payload) = split_data_uri(&uri)?;
        decode_payload(payload)?;
        Ok(Self(uri))
    }

    /// Wrap a string without validating it. Lets tests script encoder
    /// output of an exact length.
    #[cfg(test)]
    pub(crate) fn unchecked(uri: String) -> Self {
        Self(uri)
    }

    /// Length of the textual representation. This is the size the byte
    /// budget is checked against, base64 and header overhead included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Declared MIME type, e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &str {
        split_data_uri(&self.0).map(|(mime, _)| mime).unwrap_or_default()
    }

    /// Decode the base64 payload back into the raw image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, DataUriError> {
        let (_, payload) = split_data_uri(&self.0)?;
        decode_payload(payload)
    }

    /// Size of the decoded payload, computed from the base64 length.
    pub fn payload_len(&self) -> usize {
        split_data_uri(&self.0)
            .map(|(_, payload)| base64_decoded_len(payload))
            .unwrap_or(0)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedImage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = DataUriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EncodedImage> for String {
    fn from(value: EncodedImage) -> Self {
        value.0
    }
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_uri(uri: &str) -> Result<(&str, &str), DataUriError> {
    let rest = uri
        .strip_prefix(DATA_PREFIX)
        .ok_or(DataUriError::MissingPrefix)?;
    rest.split_once(BASE64_MARKER)
        .ok_or(DataUriError::NotBase64)
}

fn decode_payload(payload: &str) -> Result<Vec<u8>, DataUriError> {
    PAYLOAD_DECODER
        .decode(payload)
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))
}

/// Decoded size of a payload already accepted by [`decode_payload`].
fn base64_decoded_len(payload: &str) -> usize {
    let symbols = payload.trim_end_matches('=').len();
    symbols * 3 / 4
}
