//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for hosted text-generation backends (Gemini,
//! Ollama, ...) so the scoring oracle works with any of them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use index_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = GeminiProvider::new(GeminiConfig::new(api_key))?;
//! let completion = provider.complete(&prompt, &GenerationOptions::scoring(0.5)).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.5-flash-lite", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

const fn default_temperature() -> f32 { 0.5 }
const fn default_max_tokens() -> u32 { 500 }

/// Default hosted model for scoring
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GenerationOptions {
    /// Low-temperature decoding used for index scoring
    pub fn scoring(temperature: f32) -> Self {
        Self {
            temperature,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    pub fn text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "Gemini", "Ollama")
    pub name: String,

    /// Model requests are sent to
    pub model: String,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The scoring oracle works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get provider information
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion for a single text prompt
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion>;

    /// Estimate token count for text (provider-specific tokenization)
    fn estimate_tokens(&self, text: &str) -> u32 {
        // Default: rough estimate of ~4 chars per token
        u32::try_from(text.len() / 4).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 500);
        assert_eq!(opts.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_scoring_options() {
        let opts = GenerationOptions::scoring(0.2).with_model("llama3.2");
        assert!((opts.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(opts.model, "llama3.2");
    }
}
