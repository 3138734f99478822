//! User-selected image assets.

mod loader;
pub mod preview;
mod types;

pub use loader::AssetLoader;
pub use preview::{PreviewHandle, PreviewRegistry};
pub use types::{ImageAsset, ImageFormat};
