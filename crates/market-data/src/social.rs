//! Social Media Source
//!
//! Membit search over Twitter/X conversation clusters and posts, requested
//! in the LLM-ready text format.

use std::time::Duration;

use async_trait::async_trait;
use index_core::FetchError;

use crate::api::FetchResult;

/// Social search source (Strategy pattern)
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Trending conversation clusters matching `query`, as text
    async fn cluster_search(&self, query: &str, limit: u32) -> FetchResult<String>;

    /// Recent posts matching `query`, as text
    async fn post_search(&self, query: &str, limit: u32) -> FetchResult<String>;
}

/// Membit client configuration
#[derive(Clone, Debug)]
pub struct MembitConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl MembitConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.membit.ai/v1".into(),
            timeout_secs: 30,
        }
    }
}

/// Membit REST client
pub struct MembitClient {
    client: reqwest::Client,
    config: MembitConfig,
}

impl MembitClient {
    pub fn new(config: MembitConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn search(&self, kind: &str, query: &str, limit: u32) -> FetchResult<String> {
        let url = format!("{}/{kind}/search", self.config.base_url.trim_end_matches('/'));
        let limit = limit.to_string();
        let response = self
            .client
            .get(url)
            .header("X-Membit-Api-Key", &self.config.api_key)
            .query(&[("q", query), ("limit", limit.as_str()), ("format", "llm")])
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Membit: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                source_name: "Membit".into(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::malformed(format!("Membit: {}", e.without_url())))
    }
}

#[async_trait]
impl SocialApi for MembitClient {
    async fn cluster_search(&self, query: &str, limit: u32) -> FetchResult<String> {
        self.search("clusters", query, limit).await
    }

    async fn post_search(&self, query: &str, limit: u32) -> FetchResult<String> {
        self.search("posts", query, limit).await
    }
}
