//! Crypto Fear & Greed Index
//!
//! Five weighted factors, plus per-token scores for BTC, ETH, SOL and BNB.

use async_trait::async_trait;
use chrono::Utc;
use index_core::{FactorReading, FactorSpec, FetchError, IndexProfile, PersistedRow, ScoreBand, ScoreResult};
use index_core::format::usd;
use market_data::{Momentum, SentimentReference, SocialQuery, TokenBoard, TokenSnapshot};
use news_scraper::scrape_fear_greed;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

use crate::pipeline::{Gathered, IndexDefinition, Sources};

pub const TABLE: &str = "fear_greed_index";

pub const VOLATILITY: FactorSpec = FactorSpec::new(
    "volatility",
    "VOLATILITY",
    25.0,
    "High volatility = Fear. Unusual spikes in volatility = Extreme Fear.",
);
pub const MOMENTUM: FactorSpec = FactorSpec::new(
    "momentum",
    "MOMENTUM & VOLUME",
    25.0,
    "High buying volume in positive market = Greed. Near ATH = Extreme Greed.",
);
pub const SOCIAL: FactorSpec = FactorSpec::new(
    "social",
    "SOCIAL MEDIA",
    17.5,
    "Analyze the sentiment of these posts. Positive/FOMO = Greed. Panic/negative = Fear.",
);
pub const DOMINANCE: FactorSpec = FactorSpec::new(
    "dominance",
    "BTC DOMINANCE",
    15.0,
    "Rising BTC dominance = Fear (flight to safety). Falling dominance = Greed (altcoin speculation).",
);
pub const SENTIMENT_REFERENCE: FactorSpec = FactorSpec::new(
    "trends",
    "INDUSTRY SENTIMENT REFERENCE",
    17.5,
    "Use this as a cross-reference. If your analysis aligns with this index, it confirms the sentiment. \
     If it diverges significantly, explain why based on the data.",
);

const FACTORS: &[FactorSpec] = &[VOLATILITY, MOMENTUM, SOCIAL, DOMINANCE, SENTIMENT_REFERENCE];

const BANDS: &[ScoreBand] = &[
    ScoreBand { low: 0, high: 24, label: "Extreme Fear", meaning: "market panic, crash fears, capitulation" },
    ScoreBand { low: 25, high: 44, label: "Fear", meaning: "bearish sentiment, uncertainty, declining interest" },
    ScoreBand { low: 45, high: 55, label: "Neutral", meaning: "mixed signals, consolidation, balanced views" },
    ScoreBand { low: 56, high: 74, label: "Greed", meaning: "bullish sentiment, rising interest, buying pressure" },
    ScoreBand { low: 75, high: 100, label: "Extreme Greed", meaning: "euphoria, FOMO, unsustainable optimism" },
];

const RESPONSE_SCHEMA: &str = r#"{"score": <number 0-100>, "label": "<Extreme Fear|Fear|Neutral|Greed|Extreme Greed>", "reason": "<2-3 sentence explanation covering key factors>", "factors": {"volatility": <0-100>, "momentum": <0-100>, "social": <0-100 or null>, "dominance": <0-100>, "trends": <0-100 or null>}, "token_scores": {"BTC": {"score": <0-100>, "label": "<Extreme Fear|Fear|Neutral|Greed|Extreme Greed>", "summary": "<1 short sentence>"}, "ETH": {"score": <0-100>, "label": "<label>", "summary": "<1 short sentence>"}, "SOL": {"score": <0-100>, "label": "<label>", "summary": "<1 short sentence>"}, "BNB": {"score": <0-100>, "label": "<label>", "summary": "<1 short sentence>"}}}"#;

pub static PROFILE: IndexProfile = IndexProfile {
    name: "Fear & Greed",
    role: "You are an expert crypto market sentiment analyst creating a Fear & Greed Index. \
           Analyze ALL the following data factors and provide a comprehensive Fear & Greed score.",
    factors: FACTORS,
    bands: BANDS,
    extra_instructions: Some(
        "In addition to the overall score, also provide individual Fear & Greed scores for BTC, ETH, SOL, \
         and BNB based on their market data and the overall market sentiment.",
    ),
    response_schema: RESPONSE_SCHEMA,
    headline_note: None,
    temperature: 0.5,
};

/// Tokens scored individually; BTC comes from the momentum factor
const TOKENS: [(&str, &str); 3] = [("ethereum", "ETH"), ("solana", "SOL"), ("binancecoin", "BNB")];

const SOCIAL_QUERY: SocialQuery = SocialQuery {
    clusters: "bitcoin",
    posts: "bitcoin BTC crypto",
};

/// Raw values the fear & greed row keeps
#[derive(Clone, Debug, Default)]
pub struct FearGreedFacts {
    pub momentum: Option<Momentum>,
    pub tokens: TokenBoard,
}

/// The Fear & Greed index definition
#[derive(Clone, Copy, Debug, Default)]
pub struct FearGreed;

impl FearGreed {
    /// Public index API first, then its web page through one browser session
    async fn sentiment_reference(sources: &Sources) -> Result<SentimentReference, FetchError> {
        let api_error = match sources.fetcher.sentiment_reference().await {
            Ok(reference) => return Ok(reference),
            Err(e) => e,
        };

        tracing::info!("🔁 Trying Alternative.me page scrape");
        match scrape_fear_greed(sources.browser.as_ref(), &sources.session).await {
            Ok(score) => {
                let reference = SentimentReference::from_scraped(score, Utc::now().date_naive());
                tracing::info!(score, label = %reference.current_label, "✅ Sentiment reference scraped");
                Ok(reference)
            }
            Err(e) => {
                tracing::warn!(error = %e, "⏭️ Skipping Alternative.me, API and page both failed");
                Err(api_error)
            }
        }
    }
}

#[async_trait]
impl IndexDefinition for FearGreed {
    type Facts = FearGreedFacts;

    fn profile(&self) -> &IndexProfile {
        &PROFILE
    }

    fn table(&self) -> &'static str {
        TABLE
    }

    async fn gather(&self, sources: &Sources) -> Gathered<FearGreedFacts> {
        let fetcher = &sources.fetcher;

        let volatility = fetcher.volatility().await;
        fetcher.pause().await;
        let momentum = fetcher.momentum().await;
        fetcher.pause().await;

        let mut tokens = fetcher.token_board(&TOKENS).await;
        if let Ok(btc) = &momentum {
            tokens.push(TokenSnapshot::from_momentum("BTC", btc));
        }

        let dominance = fetcher.dominance().await;
        let social = fetcher.social(SOCIAL_QUERY).await;
        let reference = Self::sentiment_reference(sources).await;

        let context = if tokens.is_empty() {
            Vec::new()
        } else {
            vec![tokens.context_section()]
        };
        let facts = FearGreedFacts {
            momentum: momentum.as_ref().ok().cloned(),
            tokens,
        };

        Gathered {
            readings: vec![
                FactorReading::new(VOLATILITY, volatility),
                FactorReading::new(MOMENTUM, momentum),
                FactorReading::new(SOCIAL, social),
                FactorReading::new(DOMINANCE, dominance),
                FactorReading::new(SENTIMENT_REFERENCE, reference),
            ],
            context,
            facts,
        }
    }

    fn columns(&self, row: PersistedRow, facts: &FearGreedFacts, result: &ScoreResult) -> PersistedRow {
        let momentum = facts.momentum.as_ref();
        let token_prices = if facts.tokens.is_empty() {
            Value::Null
        } else {
            facts.tokens.to_json()
        };

        row.column("btc_price", momentum.and_then(|m| m.price.to_f64()))
            .column("btc_24h_change", momentum.map(|m| m.change_24h))
            .column("btc_volume", momentum.and_then(|m| m.volume_24h.to_f64()))
            .column("token_scores", &result.token_scores)
            .column("token_prices", token_prices)
    }

    fn highlights(&self, facts: &FearGreedFacts) -> Vec<String> {
        let price = facts
            .momentum
            .as_ref()
            .and_then(|m| m.price.to_f64())
            .map_or_else(|| "N/A".to_string(), usd);
        vec![format!("BTC: {price}")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sources;
    use market_data::MockMarketApi;
    use news_scraper::reference::FEAR_GREED_PAGE;
    use news_scraper::StaticBrowser;

    #[test]
    fn test_profile_weights_and_bands() {
        let total: f64 = PROFILE.factors.iter().map(|f| f.weight).sum();
        assert!((total - 100.0).abs() < f64::EPSILON);
        assert_eq!(PROFILE.label_for(24.0), Some("Extreme Fear"));
        assert_eq!(PROFILE.label_for(55.0), Some("Neutral"));
        assert_eq!(PROFILE.label_for(62.0), Some("Greed"));
        assert_eq!(PROFILE.label_for(75.0), Some("Extreme Greed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gather_with_mock_market() {
        let gathered = FearGreed.gather(&sources(MockMarketApi::new(), StaticBrowser::new())).await;

        // Social is skipped without a Membit client
        assert_eq!(gathered.available(), 4);
        assert_eq!(gathered.readings.len(), 5);

        let symbols: Vec<&str> = gathered.facts.tokens.tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["ETH", "SOL", "BNB", "BTC"]);
        assert_eq!(gathered.context.len(), 1);
        assert_eq!(FearGreed.highlights(&gathered.facts), ["BTC: $97,500"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentiment_reference_falls_back_to_page() {
        let page = r#"<html><body><div class="fng-circle"><div class="fng-score">71</div></div></body></html>"#;
        let browser = StaticBrowser::new().page(FEAR_GREED_PAGE, page);
        let sources = sources(MockMarketApi::new().failing("fear_greed"), browser.clone());

        let reference = FearGreed::sentiment_reference(&sources).await.unwrap();
        assert_eq!(reference.current_score, 71);
        assert_eq!(reference.current_label, "Greed");
        assert_eq!(reference.history.len(), 1);
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentiment_reference_absent_when_both_fail() {
        let sources = sources(MockMarketApi::new().failing("fear_greed"), StaticBrowser::new());
        let err = FearGreed::sentiment_reference(&sources).await.unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 503, .. }));
    }
}
