//! Market API Integration
//!
//! Abstractions over the public market-data sources the factor fetchers
//! read from, with an HTTP implementation and a static mock.

mod http;
mod mock;

pub use http::{HttpMarketApi, MarketApiConfig};
pub use mock::MockMarketApi;

use async_trait::async_trait;
use index_core::FetchError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a single source call
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Coin market snapshot (CoinGecko `/coins/{id}`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    /// Current USD price
    pub price: Decimal,

    /// Percent price change over 24 hours
    pub change_24h: Option<f64>,

    /// Percent price change over 7 days
    pub change_7d: Option<f64>,

    /// Percent price change over 30 days
    pub change_30d: Option<f64>,

    /// 24h trading volume in USD
    pub volume_24h: Option<Decimal>,

    /// Market capitalization in USD
    pub market_cap: Option<Decimal>,

    /// All-time high in USD
    pub ath: Option<Decimal>,

    /// Percent distance from the all-time high (negative below it)
    pub ath_change_pct: Option<f64>,
}

/// Whole-market aggregates (CoinGecko `/global`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarket {
    /// BTC share of total market cap, percent
    pub btc_dominance: f64,

    /// ETH share of total market cap, percent
    pub eth_dominance: Option<f64>,

    pub total_market_cap: Decimal,
    pub total_volume: Decimal,

    /// Percent change of total market cap over 24 hours
    pub market_cap_change_24h: f64,
}

/// One daily sample of total DeFi TVL (DefiLlama)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TvlPoint {
    /// Unix seconds
    pub date: i64,
    pub tvl: Decimal,
}

/// One daily value of the public fear & greed index (Alternative.me)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FearGreedEntry {
    pub value: u8,
    pub classification: String,

    /// Unix seconds
    pub timestamp: i64,
}

/// Market data source (Strategy pattern)
///
/// Every call is independent; a failure is reported as a [`FetchError`] and
/// never affects the other calls.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Market snapshot for a CoinGecko coin id (e.g. "bitcoin")
    async fn coin(&self, id: &str) -> FetchResult<CoinMarket>;

    /// Daily USD closing prices over the last `days` days, oldest first
    async fn daily_prices(&self, id: &str, days: u32) -> FetchResult<Vec<f64>>;

    /// Whole-market aggregates
    async fn global(&self) -> FetchResult<GlobalMarket>;

    /// Historical total DeFi TVL, oldest first
    async fn chain_tvl_history(&self) -> FetchResult<Vec<TvlPoint>>;

    /// Latest `limit` fear & greed values, newest first
    async fn fear_greed(&self, limit: u32) -> FetchResult<Vec<FearGreedEntry>>;

    /// Source name
    fn name(&self) -> &str;
}
