//! The seam between the session and whatever produces images.

use crate::error::Result;
use crate::remix::request::RemixRequest;
use crate::remix::types::RemixResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Something that turns a [`RemixRequest`] into a generated image.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait RemixBackend: Send + Sync {
    /// Generates one image for `request`.
    async fn generate(&self, request: &RemixRequest) -> Result<RemixResult>;

    /// Returns the name of this backend for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: RemixBackend + ?Sized> RemixBackend for Arc<T> {
    async fn generate(&self, request: &RemixRequest) -> Result<RemixResult> {
        (**self).generate(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
