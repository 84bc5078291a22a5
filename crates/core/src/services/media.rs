//! Base64 image payload handling.
//!
//! Recipe images and user avatars arrive inline as data URLs
//! (`data:image/png;base64,...`). This module decodes them into raw
//! bytes ready for the storage backend.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ladle_common::{AppError, AppResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// WebP format
    WebP,
    /// GIF format
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Get file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// A decoded inline image, ready to upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type declared by the data URL.
    pub content_type: String,
    /// File extension matching the MIME type.
    pub extension: &'static str,
}

/// Decode a base64 data URL into image bytes.
///
/// Accepts only `data:image/...;base64,` payloads; anything else is a
/// validation failure.
pub fn decode_data_url(data_url: &str) -> AppResult<DecodedImage> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Validation("Image must be a base64 data URL.".to_string()))?;

    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::Validation("Image must be base64 encoded.".to_string()))?;

    let format = ImageFormat::from_mime_type(mime)
        .ok_or_else(|| AppError::Validation(format!("Unsupported image type: {mime}")))?;

    let bytes = BASE64
        .decode(payload)
        .map_err(|_| AppError::Validation("Invalid base64 image data.".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Image data is empty.".to_string()));
    }

    Ok(DecodedImage {
        bytes,
        content_type: format.mime_type().to_string(),
        extension: format.extension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" in base64
    const PAYLOAD: &str = "aGVsbG8=";

    #[test]
    fn test_decode_png_data_url() {
        let decoded = decode_data_url(&format!("data:image/png;base64,{PAYLOAD}")).unwrap();

        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.extension, "png");
    }

    #[test]
    fn test_decode_jpeg_alias() {
        let decoded = decode_data_url(&format!("data:image/jpg;base64,{PAYLOAD}")).unwrap();

        assert_eq!(decoded.content_type, "image/jpeg");
        assert_eq!(decoded.extension, "jpg");
    }

    #[test]
    fn test_reject_missing_prefix() {
        let result = decode_data_url("image/png;base64,aGVsbG8=");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_reject_non_image_mime() {
        let result = decode_data_url(&format!("data:text/plain;base64,{PAYLOAD}"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_reject_invalid_base64() {
        let result = decode_data_url("data:image/png;base64,%%%");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_reject_empty_payload() {
        let result = decode_data_url("data:image/png;base64,");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(ImageFormat::from_mime_type("image/webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
        assert_eq!(ImageFormat::from_mime_type("application/pdf"), None);
    }
}
