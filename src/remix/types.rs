//! Core types for remix generation.

use crate::error::{RemixError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name offered when the generated image is downloaded.
pub const DEFAULT_DOWNLOAD_NAME: &str = "remix-ad-studio.png";

const PNG_DATA_PREFIX: &str = "data:image/png;base64,";

/// Output aspect ratio requested for every remix (portrait ad format).
pub const OUTPUT_ASPECT_RATIO: &str = "3:4";

/// Metadata about the generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated image, held as a self-describing PNG data reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be shown or saved"]
pub struct RemixResult {
    data_url: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl RemixResult {
    /// Wraps a base64 payload returned by the service.
    ///
    /// The payload is always declared as PNG, whatever the service reported.
    pub fn from_base64(payload: &str, metadata: GenerationMetadata) -> Self {
        Self {
            data_url: format!("{PNG_DATA_PREFIX}{payload}"),
            metadata,
        }
    }

    /// The `data:image/png;base64,...` reference.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// The base64 payload without its data-URI header.
    pub fn payload(&self) -> &str {
        &self.data_url[PNG_DATA_PREFIX.len()..]
    }

    /// Decodes the payload into image bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.payload())
            .map_err(|e| RemixError::Decode(e.to_string()))
    }

    /// Writes the decoded image to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

impl std::fmt::Display for RemixResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.data_url)
    }
}
