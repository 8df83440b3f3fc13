//! Factor Fetchers
//!
//! One method per data factor. Each performs its source calls, derives the
//! factor's statistics and returns a typed record or a [`FetchError`]. A
//! failure is logged here and never propagates further than the caller's
//! `FactorReading`.

use std::sync::Arc;
use std::time::Duration;

use index_core::FetchError;
use index_core::format::round2;
use rust_decimal::Decimal;

use crate::analytics;
use crate::api::{FetchResult, MarketApi};
use crate::model::{
    DefiTvl, Dominance, EthVsBtc, MarketCapShare, Momentum, SentimentReference, Social, TokenBoard, TokenSnapshot,
    VolumeShare, Volatility,
};
use crate::social::SocialApi;

/// Spacing between consecutive calls to the same rate-limited source
pub const DEFAULT_PACE: Duration = Duration::from_millis(1500);

const CLUSTER_TEXT_LIMIT: usize = 1500;
const POST_TEXT_LIMIT: usize = 2000;
const TVL_WINDOW: usize = 31;

/// Search terms for the social factor
#[derive(Clone, Copy, Debug)]
pub struct SocialQuery {
    pub clusters: &'static str,
    pub posts: &'static str,
}

/// Runs the factor fetches against a market source
pub struct FactorFetcher {
    api: Arc<dyn MarketApi>,
    social: Option<Arc<dyn SocialApi>>,
    pace: Duration,
}

fn logged<T>(factor: &str, result: FetchResult<T>) -> FetchResult<T> {
    match &result {
        Ok(_) => tracing::info!(factor, "✅ Factor fetched"),
        Err(FetchError::Skipped(reason)) => tracing::info!(factor, %reason, "⏭️ Factor skipped"),
        Err(e) => tracing::warn!(factor, error = %e, "⚠️ Factor unavailable"),
    }
    result
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

impl FactorFetcher {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self {
            api,
            social: None,
            pace: DEFAULT_PACE,
        }
    }

    /// Attach the social source; without one the social factor is skipped
    pub fn with_social(mut self, social: Option<Arc<dyn SocialApi>>) -> Self {
        self.social = social;
        self
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Wait out the rate-limit spacing
    pub async fn pause(&self) {
        if !self.pace.is_zero() {
            tokio::time::sleep(self.pace).await;
        }
    }

    /// BTC 30-day volatility, drawdown and change
    pub async fn volatility(&self) -> FetchResult<Volatility> {
        logged("volatility", self.fetch_volatility().await)
    }

    async fn fetch_volatility(&self) -> FetchResult<Volatility> {
        let prices = self.api.daily_prices("bitcoin", 30).await?;
        let (Some(&first), Some(&last)) = (prices.first(), prices.last()) else {
            return Err(FetchError::unavailable("empty BTC price history"));
        };
        if prices.len() < 2 {
            return Err(FetchError::malformed("BTC price history needs at least two samples"));
        }

        let change_30d = analytics::percent_change(first, last)
            .ok_or_else(|| FetchError::malformed("BTC price history starts at zero"))?;

        Ok(Volatility {
            volatility: round2(analytics::volatility(&prices)),
            max_drawdown: round2(analytics::max_drawdown(&prices)),
            change_30d: round2(change_30d),
            recent_prices: prices[prices.len().saturating_sub(7)..].iter().map(|p| p.round()).collect(),
        })
    }

    /// BTC price momentum and volume
    pub async fn momentum(&self) -> FetchResult<Momentum> {
        logged("momentum", self.api.coin("bitcoin").await.map(Momentum::from))
    }

    /// Market snapshots for `(coin id, symbol)` pairs, paced; failures are skipped
    pub async fn token_board(&self, tokens: &[(&str, &str)]) -> TokenBoard {
        let mut board = TokenBoard::default();
        for (id, symbol) in tokens {
            match self.api.coin(id).await {
                Ok(coin) => {
                    tracing::info!(symbol, price = %coin.price, "✅ Token fetched");
                    board.push(TokenSnapshot::from_coin(*symbol, &coin));
                }
                Err(e) => tracing::warn!(symbol, error = %e, "⚠️ Token unavailable"),
            }
            self.pause().await;
        }
        board
    }

    /// BTC dominance and whole-market aggregates
    pub async fn dominance(&self) -> FetchResult<Dominance> {
        let result = self.api.global().await.map(|global| Dominance {
            btc_dominance: round2(global.btc_dominance),
            total_market_cap: global.total_market_cap,
            total_volume: global.total_volume,
            market_cap_change_24h: round2(global.market_cap_change_24h),
        });
        logged("dominance", result)
    }

    /// Social digest; each search fails independently to empty text
    pub async fn social(&self, query: SocialQuery) -> FetchResult<Social> {
        let Some(social) = &self.social else {
            return logged("social", Err(FetchError::Skipped("MEMBIT_API_KEY not set".into())));
        };

        let cluster_text = social.cluster_search(query.clusters, 5).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "⚠️ Cluster search failed");
            String::new()
        });
        let post_text = social.post_search(query.posts, 10).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "⚠️ Post search failed");
            String::new()
        });

        let has_data = cluster_text.chars().count() > 10 || post_text.chars().count() > 10;
        tracing::debug!(
            clusters = cluster_text.len(),
            posts = post_text.len(),
            "Social text sizes"
        );

        logged(
            "social",
            Ok(Social {
                cluster_text: truncate(&cluster_text, CLUSTER_TEXT_LIMIT),
                post_text: truncate(&post_text, POST_TEXT_LIMIT),
                has_data,
            }),
        )
    }

    /// Public fear & greed index, 7-day history
    pub async fn sentiment_reference(&self) -> FetchResult<SentimentReference> {
        let result = self.api.fear_greed(7).await.and_then(|entries| {
            SentimentReference::from_entries(&entries)
                .ok_or_else(|| FetchError::unavailable("Alternative.me returned no data"))
        });
        logged("sentiment_reference", result)
    }

    /// ETH performance relative to BTC
    pub async fn eth_vs_btc(&self) -> FetchResult<EthVsBtc> {
        let result = async {
            let eth = self.api.coin("ethereum").await?;
            let btc = self.api.coin("bitcoin").await?;
            Ok::<_, FetchError>(EthVsBtc::new(&eth, &btc))
        }
        .await;
        logged("eth_vs_btc", result)
    }

    /// Altcoin share of total market cap
    pub async fn market_cap_share(&self) -> FetchResult<MarketCapShare> {
        let result = self.api.global().await.map(|global| {
            let btc_dominance = round2(global.btc_dominance);
            MarketCapShare {
                btc_dominance,
                eth_dominance: global.eth_dominance.map(round2),
                altcoin_share: round2(analytics::complement_share(btc_dominance)),
                total_market_cap: global.total_market_cap,
                market_cap_change_24h: round2(global.market_cap_change_24h),
            }
        });
        logged("market_cap_share", result)
    }

    /// DeFi TVL growth over 7 and 30 days
    pub async fn defi_tvl(&self) -> FetchResult<DefiTvl> {
        logged("defi_tvl", self.fetch_defi_tvl().await)
    }

    async fn fetch_defi_tvl(&self) -> FetchResult<DefiTvl> {
        let history = self.api.chain_tvl_history().await?;
        let recent = &history[history.len().saturating_sub(TVL_WINDOW)..];
        let (Some(oldest), Some(current)) = (recent.first(), recent.last()) else {
            return Err(FetchError::unavailable("DefiLlama returned no TVL history"));
        };
        let week_ago = recent.len().checked_sub(8).map_or(oldest, |i| &recent[i]);

        let growth = |from: Decimal| {
            analytics::decimal_growth(from, current.tvl)
                .ok_or_else(|| FetchError::malformed("TVL sample is zero"))
        };

        Ok(DefiTvl {
            current_tvl: current.tvl,
            tvl_30d_ago: oldest.tvl,
            tvl_7d_ago: week_ago.tvl,
            growth_7d: growth(week_ago.tvl)?,
            growth_30d: growth(oldest.tvl)?,
        })
    }

    /// Altcoin share of 24h volume: global total, then BTC volume
    pub async fn volume_share(&self) -> FetchResult<VolumeShare> {
        logged("volume_share", self.fetch_volume_share().await)
    }

    async fn fetch_volume_share(&self) -> FetchResult<VolumeShare> {
        let total_volume = self.api.global().await?.total_volume;
        self.pause().await;
        let btc_volume = self.api.coin("bitcoin").await?.volume_24h.unwrap_or_default();

        let altcoin_volume_share = analytics::remainder_share(total_volume, btc_volume)
            .ok_or_else(|| FetchError::malformed("total volume is zero"))?;

        Ok(VolumeShare {
            total_volume,
            btc_volume,
            altcoin_volume: total_volume - btc_volume,
            altcoin_volume_share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketApi;
    use async_trait::async_trait;
    use index_core::{FactorReading, FactorSpec};
    use rust_decimal_macros::dec;

    fn fetcher(api: MockMarketApi) -> FactorFetcher {
        FactorFetcher::new(Arc::new(api)).with_pace(Duration::ZERO)
    }

    struct HalfBrokenSocial;

    #[async_trait]
    impl SocialApi for HalfBrokenSocial {
        async fn cluster_search(&self, _query: &str, _limit: u32) -> FetchResult<String> {
            Err(FetchError::Network("reset".into()))
        }

        async fn post_search(&self, _query: &str, _limit: u32) -> FetchResult<String> {
            Ok("x".repeat(2500))
        }
    }

    const QUERY: SocialQuery = SocialQuery { clusters: "bitcoin", posts: "bitcoin BTC crypto" };

    #[tokio::test]
    async fn test_volatility_from_mock_history() {
        let record = fetcher(MockMarketApi::new()).volatility().await.unwrap();
        assert!(record.volatility > 0.0);
        assert!(record.max_drawdown > 0.0);
        assert_eq!(record.recent_prices.len(), 7);
        assert!((record.recent_prices[6] - 97_500.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_source_failure_becomes_fetch_error() {
        let fetcher = fetcher(MockMarketApi::new().failing("daily_prices").failing("global"));
        assert!(matches!(fetcher.volatility().await, Err(FetchError::Http { status: 503, .. })));
        assert!(fetcher.dominance().await.is_err());
        assert!(fetcher.market_cap_share().await.is_err());
        assert!(fetcher.volume_share().await.is_err());
        assert!(fetcher.momentum().await.is_ok());
    }

    #[tokio::test]
    async fn test_coin_and_tvl_failures_become_fetch_errors() {
        let fetcher = fetcher(MockMarketApi::new().failing("coin").failing("chain_tvl_history"));
        assert!(matches!(fetcher.momentum().await, Err(FetchError::Http { status: 503, .. })));
        assert!(matches!(fetcher.eth_vs_btc().await, Err(FetchError::Http { status: 503, .. })));
        assert!(matches!(fetcher.defi_tvl().await, Err(FetchError::Http { status: 503, .. })));
        assert!(fetcher.token_board(&[("ethereum", "ETH"), ("solana", "SOL")]).await.is_empty());
        // Unaffected sources still answer
        assert!(fetcher.volatility().await.is_ok());
    }

    #[tokio::test]
    async fn test_sentiment_reference_failure() {
        let fetcher = fetcher(MockMarketApi::new().failing("fear_greed"));
        assert!(matches!(
            fetcher.sentiment_reference().await,
            Err(FetchError::Http { status: 503, .. })
        ));
    }

    struct DownSocial;

    #[async_trait]
    impl SocialApi for DownSocial {
        async fn cluster_search(&self, _query: &str, _limit: u32) -> FetchResult<String> {
            Err(FetchError::Http { source_name: "Membit".into(), status: 502 })
        }

        async fn post_search(&self, _query: &str, _limit: u32) -> FetchResult<String> {
            Err(FetchError::Network("timed out".into()))
        }
    }

    #[tokio::test]
    async fn test_social_with_both_searches_failing_is_absent() {
        let fetcher = fetcher(MockMarketApi::new()).with_social(Some(Arc::new(DownSocial)));
        let social = fetcher.social(QUERY).await;
        assert!(social.as_ref().is_ok_and(|s| !s.has_data));

        const SOCIAL: FactorSpec = FactorSpec::new("social", "SOCIAL MEDIA", 20.0, "");
        assert!(!FactorReading::new(SOCIAL, social).is_available());
    }

    #[tokio::test]
    async fn test_social_skipped_without_client() {
        let err = fetcher(MockMarketApi::new()).social(QUERY).await.unwrap_err();
        assert!(matches!(err, FetchError::Skipped(_)));
    }

    #[tokio::test]
    async fn test_social_partial_failure_still_has_data() {
        let fetcher = fetcher(MockMarketApi::new()).with_social(Some(Arc::new(HalfBrokenSocial)));
        let social = fetcher.social(QUERY).await.unwrap();
        assert!(social.has_data);
        assert!(social.cluster_text.is_empty());
        assert_eq!(social.post_text.chars().count(), 2000);
    }

    #[tokio::test]
    async fn test_defi_tvl_growth() {
        let tvl = fetcher(MockMarketApi::new()).defi_tvl().await.unwrap();
        assert_eq!(tvl.current_tvl, dec!(119_500_000_000));
        assert_eq!(tvl.tvl_30d_ago, dec!(104_500_000_000));
        assert_eq!(tvl.tvl_7d_ago, dec!(116_000_000_000));
        assert!((tvl.growth_30d - 14.35).abs() < 1e-9);
        assert!((tvl.growth_7d - 3.02).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_volume_and_market_cap_share() {
        let fetcher = fetcher(MockMarketApi::new());
        let volume = fetcher.volume_share().await.unwrap();
        assert_eq!(volume.altcoin_volume, dec!(85_000_000_000));
        assert!((volume.altcoin_volume_share - 77.27).abs() < 1e-9);

        let share = fetcher.market_cap_share().await.unwrap();
        assert!((share.altcoin_share - 42.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_token_board_skips_unknown() {
        let board = fetcher(MockMarketApi::new())
            .token_board(&[("ethereum", "ETH"), ("notreal", "NOPE"), ("solana", "SOL")])
            .await;
        let symbols: Vec<&str> = board.tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["ETH", "SOL"]);
    }

    #[tokio::test]
    async fn test_sentiment_reference() {
        let reference = fetcher(MockMarketApi::new()).sentiment_reference().await.unwrap();
        assert_eq!(reference.current_score, 60);
        assert_eq!(reference.history.len(), 7);
    }
}
