//! Builds the outbound remix request from two assets and a scenario.

use crate::asset::ImageAsset;
use crate::remix::types::OUTPUT_ASPECT_RATIO;

/// Action used when the user leaves the scenario empty.
pub const FALLBACK_ACTION: &str =
    "The model should be holding or applying the product in a way that highlights its use.";

/// An image embedded directly in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type declared for the image.
    pub mime_type: String,
    /// Base64 payload with any data-URI header removed.
    pub data: String,
}

impl InlineImage {
    fn from_asset(asset: &ImageAsset) -> Self {
        Self {
            mime_type: asset.mime_type().to_string(),
            data: strip_data_uri(asset.encoded_payload()).to_string(),
        }
    }
}

/// Everything sent to the service for one remix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemixRequest {
    /// Instruction text, sent before the images.
    pub prompt: String,
    /// The subject ("model") image, sent first.
    pub model_image: InlineImage,
    /// The product image, sent second.
    pub product_image: InlineImage,
    /// Requested output aspect ratio.
    pub aspect_ratio: &'static str,
}

impl RemixRequest {
    /// Builds a request for `model` and `product` following `scenario`.
    pub fn build(model: &ImageAsset, product: &ImageAsset, scenario: &str) -> Self {
        Self {
            prompt: remix_prompt(scenario),
            model_image: InlineImage::from_asset(model),
            product_image: InlineImage::from_asset(product),
            aspect_ratio: OUTPUT_ASPECT_RATIO,
        }
    }

    /// Both images in wire order.
    pub fn images(&self) -> [&InlineImage; 2] {
        [&self.model_image, &self.product_image]
    }
}

/// Returns the payload after the first comma of a data reference.
///
/// Strings without a comma are assumed to be bare base64 already.
pub fn strip_data_uri(payload: &str) -> &str {
    payload
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or(payload)
}

/// Renders the instruction text for one remix.
pub fn remix_prompt(scenario: &str) -> String {
    let scenario = scenario.trim();
    let action = if scenario.is_empty() {
        FALLBACK_ACTION.to_string()
    } else {
        format!("Specific Action: {scenario}")
    };

    format!(
        "Create a photorealistic, professional-grade product advertisement.

INPUTS:
1. The first image is the \"Model\" (AI Twin), the subject of the ad.
2. The second image is the \"Product\".

TASK:
Generate one high-quality image in which the Model interacts naturally with the Product.
{action}

CRITICAL CONSTRAINTS:
- PRESERVE IDENTITY: face, hair and body structure must match the Model image exactly.
- PRESERVE PRODUCT: packaging, label and shape must match the Product image exactly.
- AESTHETICS: shallow depth of field (bokeh) focused on the model and product. Natural skin texture with subtle human flaws (pores, peach fuzz). Studio-quality, soft, flattering lighting.
- COMPOSITION: professional commercial photography.

Output ONLY the image."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetLoader;
    use base64::Engine;

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_uri("QUJD"), "QUJD");
        // Only the first comma is a separator.
        assert_eq!(strip_data_uri("data:x,a,b"), "a,b");
    }

    #[test]
    fn test_prompt_uses_scenario() {
        let prompt = remix_prompt("Applying the cream to her left cheek");
        assert!(prompt.contains("Specific Action: Applying the cream to her left cheek"));
        assert!(!prompt.contains(FALLBACK_ACTION));
    }

    #[test]
    fn test_prompt_falls_back_when_blank() {
        for scenario in ["", "   \n"] {
            let prompt = remix_prompt(scenario);
            assert!(prompt.contains(FALLBACK_ACTION));
            assert!(!prompt.contains("Specific Action:"));
        }
    }

    #[test]
    fn test_prompt_constraints() {
        let prompt = remix_prompt("");
        assert!(prompt.contains("\"Model\""));
        assert!(prompt.contains("\"Product\""));
        assert!(prompt.contains("PRESERVE IDENTITY"));
        assert!(prompt.contains("PRESERVE PRODUCT"));
        assert!(prompt.contains("depth of field"));
        assert!(prompt.contains("commercial photography"));
        assert!(prompt.ends_with("Output ONLY the image."));
    }

    #[test]
    fn test_build_embeds_both_images_in_order() {
        let loader = AssetLoader::new();
        let model = loader.from_bytes("twin.jpg", vec![0xFF, 0xD8, 0xFF, 1]).unwrap();
        let product = loader.from_bytes("cream.png", vec![9, 8, 7]).unwrap();

        let request = RemixRequest::build(&model, &product, "");
        assert_eq!(request.model_image.mime_type, "image/jpeg");
        assert_eq!(request.product_image.mime_type, "image/png");
        assert_eq!(request.aspect_ratio, "3:4");
        assert!(request.prompt.contains(FALLBACK_ACTION));

        let [first, second] = request.images();
        let engine = base64::engine::general_purpose::STANDARD;
        assert_eq!(engine.decode(&first.data).unwrap(), model.raw_bytes());
        assert_eq!(engine.decode(&second.data).unwrap(), product.raw_bytes());
        assert!(!first.data.starts_with("data:"));
    }
}
