//! Error types for remix generation.

use std::time::Duration;

/// Longest service error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Fallback text shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while generating the image.";

/// Message carried by [`RemixError::EmptyResponse`].
pub const NO_IMAGE_MESSAGE: &str = "No image data found in response.";

/// Errors that can occur while loading assets or generating a remix.
#[derive(Debug, thiserror::Error)]
pub enum RemixError {
    /// Client configuration is missing or unusable (e.g. no API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded. Reported, never retried.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay the service asked for, if it said.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters or unsupported input file.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The call succeeded but no image part came back.
    #[error("No image data found in response.")]
    EmptyResponse,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading an asset, saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used when a failure is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or rejected credential.
    Configuration,
    /// Network, HTTP or service-side failure.
    Transport,
    /// The service answered without an image.
    EmptyResponse,
    /// A selected file could not be read or is not an image.
    Input,
}

impl RemixError {
    /// Maps this error onto the user-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Auth(_) => ErrorKind::Configuration,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::InvalidRequest(_) | Self::Io(_) => ErrorKind::Input,
            Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::Network(_)
            | Self::Decode(_)
            | Self::Json(_) => ErrorKind::Transport,
        }
    }

    /// The variant's own detail text, for variants that carry one.
    ///
    /// `None` for variants whose message is fixed or comes from a wrapped
    /// source error.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Config(text)
            | Self::Auth(text)
            | Self::ContentBlocked(text)
            | Self::InvalidRequest(text)
            | Self::Decode(text) => Some(text),
            Self::Api { message, .. } => Some(message),
            Self::RateLimited { .. }
            | Self::EmptyResponse
            | Self::Network(_)
            | Self::Io(_)
            | Self::Json(_) => None,
        }
    }
}

/// Result type alias for remix operations.
pub type Result<T> = std::result::Result<T, RemixError>;

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Cleans a service error body before it reaches an error message.
///
/// Google API keys (`AIza...`) and `key=` query values are redacted, and
/// the result is truncated on a char boundary.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN + 3));
    let mut rest = text.trim();

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("key=") {
            out.push_str("key=[REDACTED]");
            rest = skip_token(tail);
        } else if rest.starts_with("AIza") {
            out.push_str("[REDACTED]");
            rest = skip_token(rest);
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    if out.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut = out
            .char_indices()
            .nth(MAX_ERROR_MESSAGE_LEN)
            .map(|(i, _)| i)
            .unwrap_or(out.len());
        out.truncate(cut);
        out.push_str("...");
    }
    out
}

fn skip_token(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(s.len());
    &s[end..]
}
