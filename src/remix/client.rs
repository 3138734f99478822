//! Gemini image-generation client.

use crate::config::RemixConfig;
use crate::error::{parse_retry_after, sanitize_error_message, RemixError, Result};
use crate::remix::backend::RemixBackend;
use crate::remix::request::{InlineImage, RemixRequest};
use crate::remix::types::{GenerationMetadata, RemixResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Sends remix requests to the Gemini `generateContent` endpoint.
///
/// Built once from a [`RemixConfig`] and reused for every request.
pub struct RemixClient {
    client: reqwest::Client,
    config: RemixConfig,
}

impl RemixClient {
    /// Creates a client around `config`.
    pub fn new(config: RemixConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RemixConfig {
        &self.config
    }

    /// Sends `request` once and returns the first image in the response.
    pub async fn generate(&self, request: &RemixRequest) -> Result<RemixResult> {
        let api_key = self.config.api_key().ok_or_else(|| {
            RemixError::Config(
                "no API key configured; set API_KEY or GOOGLE_API_KEY".into(),
            )
        })?;

        let start = Instant::now();
        let model = self.config.model().as_str();
        let url = format!("{}/models/{}:generateContent", self.config.base_url(), model);
        let body = GeminiRequest::from_remix_request(request);

        tracing::debug!(%model, aspect_ratio = %request.aspect_ratio, "sending remix request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let payload = extract_image(gemini_response)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, bytes_b64 = payload.len(), "remix generation complete");

        Ok(RemixResult::from_base64(
            &payload,
            GenerationMetadata {
                model: Some(model.to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

#[async_trait]
impl RemixBackend for RemixClient {
    async fn generate(&self, request: &RemixRequest) -> Result<RemixResult> {
        RemixClient::generate(self, request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> RemixError {
    let text = sanitize_error_message(text);
    match status {
        401 | 403 => RemixError::Auth(text),
        404 => RemixError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        ),
        429 => RemixError::RateLimited {
            retry_after: parse_retry_after(headers).map(std::time::Duration::from_secs),
        },
        _ => RemixError::Api {
            status,
            message: text,
        },
    }
}

/// Pulls the first inline image payload out of a successful response.
fn extract_image(response: GeminiResponse) -> Result<String> {
    let blocked = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| {
            f.block_reason.as_ref().map(|reason| {
                f.block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"))
            })
        });

    let candidate = response.candidates.into_iter().next();
    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());

    let image = candidate
        .and_then(|c| c.content)
        .into_iter()
        .flat_map(|c| c.parts)
        .filter_map(|p| p.inline_data)
        .map(|d| d.data)
        .find(|data| !data.is_empty());

    if let Some(data) = image {
        return Ok(data);
    }
    if let Some(msg) = blocked {
        return Err(RemixError::ContentBlocked(msg));
    }
    match finish_reason.as_deref() {
        Some(
            reason @ ("SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST"),
        ) => Err(RemixError::ContentBlocked(format!(
            "Content blocked by Gemini safety filter: {reason}"
        ))),
        _ => Err(RemixError::EmptyResponse),
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - either text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

impl From<&InlineImage> for GeminiRequestPart {
    fn from(image: &InlineImage) -> Self {
        Self::InlineData {
            inline_data: GeminiInlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
}

impl GeminiRequest {
    fn from_remix_request(req: &RemixRequest) -> Self {
        let mut parts = vec![GeminiRequestPart::Text {
            text: req.prompt.clone(),
        }];
        parts.extend(req.images().into_iter().map(GeminiRequestPart::from));

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: req.aspect_ratio.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetLoader;

    fn sample_request(scenario: &str) -> RemixRequest {
        let loader = AssetLoader::new();
        let model = loader.from_bytes("twin.jpg", vec![1, 2, 3]).unwrap();
        let product = loader.from_bytes("bottle.png", vec![4, 5, 6]).unwrap();
        RemixRequest::build(&model, &product, scenario)
    }

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let body = GeminiRequest::from_remix_request(&sample_request("holding it up"));
        let json = serde_json::to_value(&body).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0]["text"]
            .as_str()
            .unwrap()
            .contains("Specific Action: holding it up"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["inlineData"]["data"], "BAUG");

        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE"])
        );
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_extract_single_image() {
        let resp = parse(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"QUJD"}}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_image(resp).unwrap(), "QUJD");
    }

    #[test]
    fn test_extract_skips_text_parts() {
        let resp = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your ad"},
                {"inlineData":{"mimeType":"image/png","data":""}},
                {"inlineData":{"mimeType":"image/jpeg","data":"Rk9P"}},
                {"inlineData":{"mimeType":"image/png","data":"QkFS"}}
            ]}}]}"#,
        );
        assert_eq!(extract_image(resp).unwrap(), "Rk9P");
    }

    #[test]
    fn test_extract_zero_parts_is_empty_response() {
        let resp = parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#);
        assert!(matches!(extract_image(resp), Err(RemixError::EmptyResponse)));

        let resp = parse(r#"{"candidates":[]}"#);
        assert!(matches!(extract_image(resp), Err(RemixError::EmptyResponse)));

        let resp = parse(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
        assert!(matches!(extract_image(resp), Err(RemixError::EmptyResponse)));
    }

    #[test]
    fn test_extract_prompt_block() {
        let resp = parse(
            r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY","blockReasonMessage":"Prompt was blocked due to safety"}}"#,
        );
        match extract_image(resp) {
            Err(RemixError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety")
            }
            other => panic!("expected ContentBlocked, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_safety_finish_reason() {
        let resp = parse(r#"{"candidates":[{"finishReason":"IMAGE_SAFETY"}]}"#);
        assert!(matches!(
            extract_image(resp),
            Err(RemixError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_parse_error_classification() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(403, "denied", &headers),
            RemixError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            RemixError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            RemixError::RateLimited { retry_after: None }
        ));
        match parse_error(500, "internal", &headers) {
            RemixError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_sending() {
        // Unroutable base URL: reaching the network would produce a Network error instead.
        let config = RemixConfig::builder()
            .base_url("http://127.0.0.1:1/v1beta")
            .build();
        let client = RemixClient::new(config);
        let err = client.generate(&sample_request("")).await.unwrap_err();
        assert!(matches!(err, RemixError::Config(_)));
    }
}
