//! Core asset types.

use crate::asset::preview::PreviewHandle;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats accepted in an asset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
    /// GIF format (first frame is what the model sees).
    Gif,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects the format of a file, by extension first and content second.
    pub fn detect(path: &Path, data: &[u8]) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .or_else(|| Self::from_magic_bytes(data))
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        None
    }
}

/// An image the user placed in one of the session's slots.
///
/// Created once by the [`AssetLoader`](crate::asset::AssetLoader) and never
/// modified. Dropping the asset releases its preview handle.
#[derive(Debug)]
pub struct ImageAsset {
    name: String,
    raw_bytes: Vec<u8>,
    encoded_payload: String,
    format: ImageFormat,
    preview: PreviewHandle,
}

impl ImageAsset {
    pub(crate) fn new(
        name: String,
        raw_bytes: Vec<u8>,
        format: ImageFormat,
        preview: PreviewHandle,
    ) -> Self {
        use base64::Engine;
        let encoded_payload = format!(
            "data:{};base64,{}",
            format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&raw_bytes)
        );
        Self {
            name,
            raw_bytes,
            encoded_payload,
            format,
            preview,
        }
    }

    /// File name the asset was selected from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original file content.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// The content as a `data:<mime>;base64,<payload>` reference.
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// Declared MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Detected image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Local preview reference. Valid until the asset is dropped.
    pub fn preview_reference(&self) -> &str {
        self.preview.reference()
    }

    /// Size of the original file in bytes.
    pub fn size(&self) -> usize {
        self.raw_bytes.len()
    }
}
