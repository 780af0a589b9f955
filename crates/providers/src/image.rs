//! Meme image generation.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::openai::{ImageRequest, OpenAiApi};
use crate::placeholder::placeholder_image_url;
use crate::ProviderError;

/// Produces an image URL for a prediction.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prediction: &str) -> Result<String, ProviderError>;
}

/// Outcome of an image stage that never fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResult {
    /// Generated image, or a placeholder built from the prediction text.
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Run `generator`, substituting a deterministic placeholder on failure.
pub async fn generate_or_placeholder(generator: &dyn ImageGenerator, prediction: &str) -> ImageResult {
    match generator.generate(prediction).await {
        Ok(url) if !url.trim().is_empty() => ImageResult {
            url,
            success: true,
            error: None,
        },
        Ok(_) => ImageResult {
            url: placeholder_image_url(prediction),
            success: false,
            error: Some("No image URL returned".to_string()),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Image generation failed, using placeholder");
            ImageResult {
                url: placeholder_image_url(prediction),
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

const MEME_STYLES: &[&str] = &[
    "viral crypto meme with bold text and rocket emojis",
    "pepe the frog style crypto meme",
    "diamond hands meme format",
    "to the moon meme style",
    "wojak crypto trader meme",
    "chad vs virgin crypto meme format",
];

const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";

/// Image-generation backed [`ImageGenerator`].
pub struct OpenAiImageGenerator {
    api: Arc<OpenAiApi>,
    model: String,
}

impl OpenAiImageGenerator {
    pub fn new(api: Arc<OpenAiApi>) -> Self {
        Self {
            api,
            model: IMAGE_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prediction: &str) -> Result<String, ProviderError> {
        let style = *MEME_STYLES.choose(&mut rand::rng()).unwrap_or(&MEME_STYLES[0]);

        let request = ImageRequest {
            model: self.model.clone(),
            prompt: format!(
                "Create a {style} about: \"{prediction}\". Make it colorful, bold, and shareable \
                 on social media. Include crypto symbols like Bitcoin logos, rocket ships, or \
                 diamond hands. Text should be readable and funny."
            ),
            size: IMAGE_SIZE.to_string(),
            quality: "standard".to_string(),
            n: 1,
        };

        self.api
            .generate_image(&request)
            .await?
            .ok_or(ProviderError::EmptyResponse("image generation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl ImageGenerator for Broken {
        async fn generate(&self, _: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Other("backend down".into()))
        }
    }

    struct Blank;

    #[async_trait]
    impl ImageGenerator for Blank {
        async fn generate(&self, _: &str) -> Result<String, ProviderError> {
            Ok("  ".into())
        }
    }

    #[tokio::test]
    async fn failure_falls_back_to_placeholder_with_text() {
        let text = "Solana will reach $1000 this year!";
        let result = generate_or_placeholder(&Broken, text).await;
        assert!(!result.success);
        assert_eq!(result.url, placeholder_image_url(text));
        assert!(result.error.unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn blank_url_is_treated_as_failure() {
        let result = generate_or_placeholder(&Blank, "x").await;
        assert!(!result.success);
        assert!(!result.url.is_empty());
    }
}
