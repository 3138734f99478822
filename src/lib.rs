#![warn(missing_docs)]
//! Remix Studio - composite a model photo and a product photo into an ad.
//!
//! The user fills two slots (the "model" subject and the "product"), may
//! describe how they interact, and submits. The pair is sent to a Gemini
//! image model with a fixed advertising prompt and the returned image is
//! shown, downloaded or discarded.
//!
//! # Quick Start
//!
//! ```no_run
//! use remix_studio::{AssetLoader, RemixClient, RemixConfig, Session, SessionState};
//!
//! #[tokio::main]
//! async fn main() -> remix_studio::Result<()> {
//!     let loader = AssetLoader::new();
//!     let client = RemixClient::new(RemixConfig::from_env());
//!     let mut session = Session::new(client);
//!
//!     session.select_model_asset(loader.load("twin.jpg").await?);
//!     session.select_product_asset(loader.load("serum.png").await?);
//!     session.set_scenario("Applying the serum to her cheek");
//!     session.submit().await;
//!
//!     match session.state() {
//!         SessionState::Success(image) => image.save("remix-ad-studio.png")?,
//!         SessionState::Error(detail) => eprintln!("failed: {detail}"),
//!         _ => {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `remix-studio` command-line front end

pub mod asset;
pub mod config;
pub mod console;
mod error;
pub mod remix;
pub mod session;
pub mod view;

// Re-export error types at crate root
pub use error::{ErrorKind, RemixError, Result, GENERIC_FAILURE_MESSAGE, NO_IMAGE_MESSAGE};

pub use asset::{AssetLoader, ImageAsset, ImageFormat, PreviewRegistry};
pub use config::{GeminiModel, RemixConfig, RemixConfigBuilder};
pub use remix::{
    GenerationMetadata, RemixBackend, RemixClient, RemixRequest, RemixResult,
    DEFAULT_DOWNLOAD_NAME, OUTPUT_ASPECT_RATIO,
};
pub use session::{ErrorDetail, Session, SessionState, Slot, SubmitTicket};
pub use view::SessionView;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::asset::{AssetLoader, ImageAsset};
    pub use crate::config::RemixConfig;
    pub use crate::error::{RemixError, Result};
    pub use crate::remix::{RemixBackend, RemixClient, RemixRequest, RemixResult};
    pub use crate::session::{Session, SessionState};
    pub use crate::view::SessionView;
}
