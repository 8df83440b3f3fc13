use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use index_core::{Completion, GenerationOptions, LlmProvider, ProviderInfo, Result, ScoringOracle};
use market_data::{FactorFetcher, MockMarketApi};
use news_scraper::{SessionConfig, StaticBrowser};
use tokio::sync::Mutex;

use crate::pipeline::Sources;

/// Oracle stand-in that answers every prompt with the same text
pub struct ScriptedProvider {
    reply: &'static str,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(reply: &'static str) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().await.last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Scripted".into(),
            model: "scripted".into(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());
        Ok(Completion::text(&options.model, self.reply))
    }
}

pub fn scripted_oracle(reply: &'static str) -> (ScoringOracle, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::new(reply));
    let oracle = ScoringOracle::new(
        Arc::clone(&provider) as Arc<dyn LlmProvider>,
        GenerationOptions::scoring(0.5),
    );
    (oracle, provider)
}

pub fn sources(api: MockMarketApi, browser: StaticBrowser) -> Sources {
    Sources {
        fetcher: FactorFetcher::new(Arc::new(api)).with_pace(Duration::ZERO),
        browser: Arc::new(browser),
        session: SessionConfig::cron(),
    }
}
