//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for Google's hosted `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use index_core::{
    error::{IndexError, Result},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Model used when the request options leave it empty
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: index_core::provider::DEFAULT_MODEL.into(),
            timeout_secs: 60,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn model<'a>(&'a self, options: &'a GenerationOptions) -> &'a str {
        if options.model.is_empty() {
            &self.config.model
        } else {
            &options.model
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn map_status(status: StatusCode, body: &str) -> IndexError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Gemini API error".into());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IndexError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => IndexError::RateLimited(message),
            s if s.is_server_error() => IndexError::ProviderUnavailable(message),
            _ => IndexError::Provider(message),
        }
    }

    fn convert_completion(response: GenerateResponse, model: &str) -> Completion {
        let first = response.candidates.into_iter().next();
        let finish_reason = first
            .as_ref()
            .and_then(|c| c.finish_reason.as_deref())
            .map(|reason| match reason {
                "STOP" => FinishReason::Stop,
                "MAX_TOKENS" => FinishReason::Length,
                "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
                _ => FinishReason::Error,
            });
        let content = first
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Completion {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            finish_reason,
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini".into(),
            model: self.config.model.clone(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!(
            "{}/v1beta/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        match self.client.get(url).query(&[("key", &self.config.api_key)]).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        let model = self.model(options);
        let request = GenerateRequest {
            contents: [Content { parts: [Part { text: prompt }] }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", &self.config.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| IndexError::ProviderUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IndexError::ProviderUnavailable(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(Self::map_status(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        let completion = Self::convert_completion(parsed, model);
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Gemini usage"
            );
        }
        Ok(completion)
    }
}
