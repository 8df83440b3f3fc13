//! Altcoin Season Index
//!
//! Six weighted factors measuring whether capital is rotating out of BTC.

use async_trait::async_trait;
use index_core::{FactorReading, FactorSpec, FetchError, IndexProfile, PersistedRow, ScoreBand, ScoreResult};
use market_data::{MarketCapShare, MarketReference, SocialQuery};
use news_scraper::scrape_altcoin_season;
use rust_decimal::prelude::ToPrimitive;

use crate::pipeline::{Gathered, IndexDefinition, Sources};

pub const TABLE: &str = "altcoin_season_score";

pub const ETH_VS_BTC: FactorSpec = FactorSpec::new(
    "ethVsBtc",
    "ETH vs BTC PERFORMANCE",
    20.0,
    "ETH outperforming BTC = Altcoin Season signal. Consistent outperformance across timeframes = strong signal.",
);
pub const MARKET_CAP_SHARE: FactorSpec = FactorSpec::new(
    "marketCapShare",
    "ALTCOIN MARKET CAP SHARE",
    20.0,
    "BTC dominance < 50% = Altcoin Season territory. Falling BTC dominance = money flowing to altcoins.",
);
pub const DEFI_TVL: FactorSpec = FactorSpec::new(
    "defiTvl",
    "DEFI TVL GROWTH",
    20.0,
    "Growing TVL = capital flowing into DeFi (altcoins). Rapid TVL growth = strong Altcoin Season signal.",
);
pub const VOLUME_SHARE: FactorSpec = FactorSpec::new(
    "volumeShare",
    "ALTCOIN VOLUME SHARE",
    10.0,
    "Altcoin volume share > 60% = lots of altcoin trading activity = Altcoin Season signal.",
);
pub const SOCIAL: FactorSpec = FactorSpec::new(
    "social",
    "SOCIAL MEDIA",
    20.0,
    "Analyze sentiment about altcoins. Positive/FOMO about altcoins = Altcoin Season signal. \
     Focus on BTC only = Bitcoin Season.",
);
pub const MARKET_REFERENCE: FactorSpec = FactorSpec::new(
    "marketRef",
    "MARKET REFERENCE",
    10.0,
    "Use this as a cross-reference. Your analysis should roughly align with this, but explain any divergence.",
);

const FACTORS: &[FactorSpec] = &[ETH_VS_BTC, MARKET_CAP_SHARE, DEFI_TVL, VOLUME_SHARE, SOCIAL, MARKET_REFERENCE];

const BANDS: &[ScoreBand] = &[
    ScoreBand { low: 0, high: 24, label: "Bitcoin Season", meaning: "BTC dominates, altcoins underperform, money flows to BTC" },
    ScoreBand { low: 25, high: 44, label: "Mostly Bitcoin", meaning: "BTC still leading, some altcoin interest" },
    ScoreBand { low: 45, high: 55, label: "Neutral", meaning: "mixed signals, no clear trend" },
    ScoreBand { low: 56, high: 74, label: "Mostly Altcoins", meaning: "altcoins gaining strength, money flowing from BTC" },
    ScoreBand { low: 75, high: 100, label: "Altcoin Season", meaning: "altcoins outperform, high DeFi activity, alt speculation" },
];

const RESPONSE_SCHEMA: &str = r#"{"score": <number 0-100>, "label": "<Bitcoin Season|Mostly Bitcoin|Neutral|Mostly Altcoins|Altcoin Season>", "reason": "<2-3 sentence explanation covering key factors>", "factors": {"ethVsBtc": <0-100>, "marketCapShare": <0-100>, "defiTvl": <0-100>, "volumeShare": <0-100>, "social": <0-100 or null>, "marketRef": <0-100 or null>}}"#;

pub static PROFILE: IndexProfile = IndexProfile {
    name: "Altcoin Season",
    role: "You are an expert crypto market analyst creating an Altcoin Season Index. \
           Analyze ALL the following data factors and determine whether we are in Altcoin Season or Bitcoin Season.",
    factors: FACTORS,
    bands: BANDS,
    extra_instructions: None,
    response_schema: RESPONSE_SCHEMA,
    headline_note: Some("(These are for context only, not scored as a factor)"),
    temperature: 0.2,
};

const SOCIAL_QUERY: SocialQuery = SocialQuery {
    clusters: "altcoin season ethereum defi",
    posts: "altcoin season ethereum solana DeFi altcoins",
};

/// Source credited for the scraped reference value
const REFERENCE_SOURCE: &str = "CoinMarketCap";

/// Raw values the altcoin season row keeps
#[derive(Clone, Debug, Default)]
pub struct AltcoinSeasonFacts {
    pub market_cap: Option<MarketCapShare>,
}

/// The Altcoin Season index definition
#[derive(Clone, Copy, Debug, Default)]
pub struct AltcoinSeason;

impl AltcoinSeason {
    /// Third-party altcoin season value, read from its web page
    async fn market_reference(sources: &Sources) -> Result<MarketReference, FetchError> {
        match scrape_altcoin_season(sources.browser.as_ref(), &sources.session).await {
            Ok(score) => {
                let reference = MarketReference::new(REFERENCE_SOURCE, score);
                tracing::info!(factor = "market_reference", score, label = %reference.label, "✅ Factor fetched");
                Ok(reference)
            }
            Err(e) => {
                tracing::warn!(factor = "market_reference", error = %e, "⚠️ Factor unavailable");
                Err(FetchError::unavailable(format!("{REFERENCE_SOURCE}: {e}")))
            }
        }
    }
}

#[async_trait]
impl IndexDefinition for AltcoinSeason {
    type Facts = AltcoinSeasonFacts;

    fn profile(&self) -> &IndexProfile {
        &PROFILE
    }

    fn table(&self) -> &'static str {
        TABLE
    }

    async fn gather(&self, sources: &Sources) -> Gathered<AltcoinSeasonFacts> {
        let fetcher = &sources.fetcher;

        let eth_vs_btc = fetcher.eth_vs_btc().await;
        fetcher.pause().await;
        let market_cap = fetcher.market_cap_share().await;
        fetcher.pause().await;
        let volume = fetcher.volume_share().await;
        let tvl = fetcher.defi_tvl().await;
        let social = fetcher.social(SOCIAL_QUERY).await;
        let reference = Self::market_reference(sources).await;

        let facts = AltcoinSeasonFacts {
            market_cap: market_cap.as_ref().ok().cloned(),
        };

        Gathered {
            readings: vec![
                FactorReading::new(ETH_VS_BTC, eth_vs_btc),
                FactorReading::new(MARKET_CAP_SHARE, market_cap),
                FactorReading::new(DEFI_TVL, tvl),
                FactorReading::new(VOLUME_SHARE, volume),
                FactorReading::new(SOCIAL, social),
                FactorReading::new(MARKET_REFERENCE, reference),
            ],
            context: Vec::new(),
            facts,
        }
    }

    fn columns(&self, row: PersistedRow, facts: &AltcoinSeasonFacts, _result: &ScoreResult) -> PersistedRow {
        let share = facts.market_cap.as_ref();
        row.column("total_market_cap", share.and_then(|s| s.total_market_cap.to_f64()))
            .column("altcoin_market_cap", share.and_then(|s| s.altcoin_market_cap().to_f64()))
            .column("btc_dominance", share.map(|s| s.btc_dominance))
    }

    fn highlights(&self, facts: &AltcoinSeasonFacts) -> Vec<String> {
        let percent = |value: Option<f64>| value.map_or_else(|| "N/A".to_string(), |v| format!("{v}%"));
        let share = facts.market_cap.as_ref();
        vec![
            format!("BTC Dominance: {}", percent(share.map(|s| s.btc_dominance))),
            format!("Altcoin Share: {}", percent(share.map(|s| s.altcoin_share))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sources;
    use index_core::Headline;
    use market_data::MockMarketApi;
    use news_scraper::reference::ALTCOIN_SEASON_PAGE;
    use news_scraper::StaticBrowser;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    const CMC_PAGE: &str = "<html><body><h1>Altcoin Season Index: 38</h1></body></html>";

    #[test]
    fn test_profile_weights() {
        let total: f64 = PROFILE.factors.iter().map(|f| f.weight).sum();
        assert!((total - 100.0).abs() < f64::EPSILON);
        assert_eq!(PROFILE.label_for(30.0), Some("Mostly Bitcoin"));
        assert_eq!(PROFILE.factor("marketRef").map(|f| f.weight), Some(10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gather_with_reference_page() {
        let browser = StaticBrowser::new().page(ALTCOIN_SEASON_PAGE, CMC_PAGE);
        let gathered = AltcoinSeason.gather(&sources(MockMarketApi::new(), browser)).await;

        // Everything but social
        assert_eq!(gathered.available(), 5);
        let reference = gathered.readings.iter().find(|r| r.spec.key == "marketRef").unwrap();
        let lines = reference.record().unwrap().describe();
        assert_eq!(lines[1], "Altcoin Season Index Score: 38 (Mostly Bitcoin)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_market_data_gives_null_columns() {
        let api = MockMarketApi::new().failing("global");
        let gathered = AltcoinSeason.gather(&sources(api, StaticBrowser::new())).await;
        assert!(gathered.facts.market_cap.is_none());
        assert_eq!(AltcoinSeason.highlights(&gathered.facts), ["BTC Dominance: N/A", "Altcoin Share: N/A"]);

        let result = ScoreResult {
            score: 30.0,
            label: "Mostly Bitcoin".into(),
            reason: "x".into(),
            factors: BTreeMap::new(),
            token_scores: None,
        };
        let row = PersistedRow::new(TABLE, Uuid::new_v4(), result.clone(), vec![Headline::new("A", "T", "https://a/1")]);
        let json = AltcoinSeason.columns(row, &gathered.facts, &result).to_json();
        assert!(json["total_market_cap"].is_null());
        assert!(json["btc_dominance"].is_null());
        assert_eq!(json["headlines"][0]["site"], "A");
    }
}
