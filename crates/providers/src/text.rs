//! Prediction text generation.

use std::sync::Arc;

use async_trait::async_trait;
use augur_core::analysis::{analyze_confidence, categorize, extract_timeframe};
use augur_core::prediction::{Category, Confidence};
use rand::seq::IndexedRandom;

use crate::openai::{ChatMessage, ChatRequest, OpenAiApi};
use crate::ProviderError;

/// Text plus the tags derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub confidence: Confidence,
    pub timeframe: String,
    pub category: Category,
}

impl GeneratedText {
    /// Wrap raw text, deriving its tags by keyword analysis.
    pub fn analyzed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            confidence: analyze_confidence(&text),
            timeframe: extract_timeframe(&text).to_string(),
            category: categorize(&text),
            text,
        }
    }
}

/// Produces prediction text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self) -> Result<GeneratedText, ProviderError>;
}

const SYSTEM_PROMPT: &str = "You are a crypto analyst making bold, specific predictions. \
     Be exciting but realistic. Format: '[CRYPTO/EVENT] will [ACTION] by [SPECIFIC TIME]'. \
     Keep it under 60 characters for social media.";

const USER_PROMPTS: &[&str] = &[
    "Generate a bold crypto price prediction for 2025. Include specific numbers and timeframes.",
    "Create an exciting prediction about a crypto technology breakthrough in 2025.",
    "Predict a major crypto adoption milestone that could happen this year.",
    "Generate a prediction about crypto regulation or institutional adoption in 2025.",
    "Create a bold prediction about a specific altcoin's performance in 2025.",
];

const TEXT_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 60;
const TEMPERATURE: f32 = 0.8;

/// Chat-completion backed [`TextGenerator`].
pub struct OpenAiTextGenerator {
    api: Arc<OpenAiApi>,
    model: String,
}

impl OpenAiTextGenerator {
    pub fn new(api: Arc<OpenAiApi>) -> Self {
        Self {
            api,
            model: TEXT_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(&self) -> Result<GeneratedText, ProviderError> {
        let prompt = *USER_PROMPTS.choose(&mut rand::rng()).unwrap_or(&USER_PROMPTS[0]);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let text = self
            .api
            .chat_completion(&request)
            .await?
            .map(|t| t.trim().trim_matches('"').to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::EmptyResponse("chat completion"))?;

        Ok(GeneratedText::analyzed(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzed_derives_tags() {
        let generated = GeneratedText::analyzed("Solana will reach $1000 this week");
        assert_eq!(generated.confidence, Confidence::High);
        assert_eq!(generated.timeframe, "This Week");
        assert_eq!(generated.category, Category::Price);
    }

    #[tokio::test]
    async fn unconfigured_api_fails() {
        let api = Arc::new(OpenAiApi::new("http://127.0.0.1:1", None));
        let err = OpenAiTextGenerator::new(api).generate().await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::OpenAi(crate::OpenAiError::MissingApiKey)
        ));
    }
}
