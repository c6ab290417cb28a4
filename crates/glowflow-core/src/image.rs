//! Upload validation: size ceiling and magic-byte MIME detection.
//!
//! Detection never decodes the image; it only looks at a fixed prefix of the
//! byte stream.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fmt;
use thiserror::Error;

const BYTES_PER_MEGABYTE: usize = 1024 * 1024;
pub const DEFAULT_MAX_IMAGE_MB: usize = 5;

/// Only this many leading bytes are ever inspected.
const SIGNATURE_PREFIX_LEN: usize = 12;
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MARKER: &[u8] = b"WEBP";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image is {size} bytes; the limit is {max_bytes} bytes")]
    TooLarge { size: usize, max_bytes: usize },
    #[error("unsupported image type '{0}'; accepted: JPEG, PNG, WebP")]
    UnsupportedType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Jpeg,
    Png,
    Webp,
    /// Anything without a recognised signature.
    OctetStream,
}

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Parse a configured image MIME type. `image/jpg` is accepted as an alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identify the image format from its leading bytes.
pub fn detect_mime(bytes: &[u8]) -> MimeType {
    let head = &bytes[..bytes.len().min(SIGNATURE_PREFIX_LEN)];

    if head.starts_with(JPEG_MAGIC) {
        MimeType::Jpeg
    } else if head.starts_with(PNG_MAGIC) {
        MimeType::Png
    } else if head.starts_with(RIFF_MAGIC)
        && head.windows(WEBP_MARKER.len()).any(|w| w == WEBP_MARKER)
    {
        MimeType::Webp
    } else {
        MimeType::OctetStream
    }
}

/// Encode image bytes as a `data:` URI suitable for a vision model request.
pub fn to_data_uri(bytes: &[u8], mime: MimeType) -> String {
    format!("data:{};base64,{}", mime.as_str(), BASE64.encode(bytes))
}

/// Upload constraints, supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    pub max_bytes: usize,
    pub allowed: Vec<MimeType>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self::from_megabytes(
            DEFAULT_MAX_IMAGE_MB,
            vec![MimeType::Jpeg, MimeType::Png, MimeType::Webp],
        )
    }
}

impl ImagePolicy {
    pub fn from_megabytes(max_mb: usize, allowed: Vec<MimeType>) -> Self {
        Self {
            max_bytes: max_mb.saturating_mul(BYTES_PER_MEGABYTE),
            allowed,
        }
    }

    /// Check size first, then signature. Returns the detected MIME type.
    pub fn validate(&self, bytes: &[u8]) -> Result<MimeType, ImageError> {
        if bytes.len() > self.max_bytes {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                max_bytes: self.max_bytes,
            });
        }

        let mime = detect_mime(bytes);
        if mime == MimeType::OctetStream || !self.allowed.contains(&mime) {
            return Err(ImageError::UnsupportedType(mime.as_str().to_string()));
        }
        Ok(mime)
    }
}
