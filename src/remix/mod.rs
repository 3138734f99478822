//! Remix request building and generation.

mod backend;
mod client;
pub mod request;
mod types;

pub use backend::RemixBackend;
pub use client::RemixClient;
pub use request::{InlineImage, RemixRequest};
pub use types::{GenerationMetadata, RemixResult, DEFAULT_DOWNLOAD_NAME, OUTPUT_ASPECT_RATIO};
