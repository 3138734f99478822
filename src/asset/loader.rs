//! Turns selected files into [`ImageAsset`]s.

use crate::asset::preview::PreviewRegistry;
use crate::asset::types::{ImageAsset, ImageFormat};
use crate::error::{RemixError, Result};
use std::path::Path;

/// Loads image files into assets, issuing preview handles from one registry.
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    previews: PreviewRegistry,
}

impl AssetLoader {
    /// Creates a loader with its own preview registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry this loader acquires preview handles from.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Reads `path` and builds an asset from its full content.
    ///
    /// Files that are not PNG, JPEG, WebP or GIF are rejected.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<ImageAsset> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let format = ImageFormat::detect(path, &data).ok_or_else(|| {
            RemixError::InvalidRequest(format!("{} is not a supported image", path.display()))
        })?;

        tracing::debug!(file = %name, bytes = data.len(), mime = format.mime_type(), "loaded asset");
        Ok(ImageAsset::new(
            name.clone(),
            data,
            format,
            self.previews.acquire(&name),
        ))
    }

    /// Loads the chosen file, if any. An empty selection yields `Ok(None)`.
    pub async fn load_selection(&self, path: Option<&Path>) -> Result<Option<ImageAsset>> {
        match path {
            Some(p) => self.load(p).await.map(Some),
            None => Ok(None),
        }
    }

    /// Builds an asset from bytes already in memory.
    pub fn from_bytes(&self, name: impl Into<String>, data: Vec<u8>) -> Result<ImageAsset> {
        let name = name.into();
        let format = ImageFormat::detect(Path::new(&name), &data).ok_or_else(|| {
            RemixError::InvalidRequest(format!("{name} is not a supported image"))
        })?;
        let preview = self.previews.acquire(&name);
        Ok(ImageAsset::new(name, data, format, preview))
    }
}
