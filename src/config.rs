//! Client configuration.
//!
//! A [`RemixConfig`] is resolved once per process and moved into the
//! [`RemixClient`](crate::remix::RemixClient); nothing mutates it afterwards.

use std::fmt;
use std::str::FromStr;

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GOOGLE_API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, generally available).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality, billing gated).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flash" | "nano-banana" | "gemini-2.5-flash-image" => Ok(Self::NanoBanana),
            "pro" | "nano-banana-pro" | "gemini-3-pro-image-preview" => Ok(Self::NanoBananaPro),
            other => Err(format!("unknown Gemini image model: {other}")),
        }
    }
}

/// Settings for talking to the image-generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct RemixConfig {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: String,
}

impl RemixConfig {
    /// Creates a new `RemixConfigBuilder`.
    pub fn builder() -> RemixConfigBuilder {
        RemixConfigBuilder::new()
    }

    /// Resolves the configuration from the process environment.
    ///
    /// Shorthand for [`RemixConfigBuilder::from_env`] followed by `build()`.
    pub fn from_env() -> Self {
        RemixConfigBuilder::from_env().build()
    }

    /// The API key, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The model variant requests are sent to.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    /// Base URL of the API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for RemixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemixConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for RemixConfig.
#[derive(Debug, Clone, Default)]
pub struct RemixConfigBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl RemixConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from the process environment.
    ///
    /// Reads the key from `API_KEY`, then `GOOGLE_API_KEY`. `REMIX_MODEL`
    /// and `REMIX_BASE_URL` are optional. A missing key is not an error
    /// here; the first generate call reports it. Setters called afterwards
    /// override what the environment provided.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        {
            builder = builder.api_key(key);
        }
        if let Ok(model) = std::env::var("REMIX_MODEL") {
            match model.parse() {
                Ok(m) => builder = builder.model(m),
                Err(e) => tracing::warn!("ignoring REMIX_MODEL: {e}"),
            }
        }
        if let Ok(url) = std::env::var("REMIX_BASE_URL") {
            builder = builder.base_url(url);
        }
        builder
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RemixConfig {
        let base_url = self
            .base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        RemixConfig {
            api_key: self.api_key,
            model: self.model,
            base_url,
        }
    }
}
