//! Scoring Oracle Client
//!
//! Sends an assembled prompt to an [`LlmProvider`] and validates the reply.

use std::sync::Arc;

use crate::error::Result;
use crate::prompt::ScoringPrompt;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::score::{parse_reply, ScoreResult};

/// Oracle wrapper around a provider with fixed decoding options
pub struct ScoringOracle {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl ScoringOracle {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// One request, no retries: a contract violation is returned as
    /// `NoJsonFound` / `InvalidScore` / `Parse`.
    pub async fn score(&self, prompt: &ScoringPrompt) -> Result<ScoreResult> {
        let info = self.provider.info();
        tracing::info!(
            provider = %info.name,
            model = %self.options.model,
            prompt_tokens = self.provider.estimate_tokens(prompt.as_str()),
            "Requesting score"
        );

        let completion = self.provider.complete(prompt.as_str(), &self.options).await?;
        tracing::debug!(chars = completion.content.len(), "Oracle replied");

        let result = parse_reply(&completion.content)?;
        tracing::info!(score = result.score, label = %result.label, "Oracle verdict");
        Ok(result)
    }
}
