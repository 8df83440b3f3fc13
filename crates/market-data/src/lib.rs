//! # market-data
//!
//! Factor fetchers for the market index scorers.
//!
//! ## Sources
//!
//! - **CoinGecko**: coin snapshots, BTC price history, global aggregates
//! - **DefiLlama**: historical total DeFi TVL
//! - **Alternative.me**: public fear & greed index
//! - **Membit**: Twitter/X clusters and posts (optional, needs a key)
//!
//! Every fetch returns `Result<Record, FetchError>`. A failed factor is
//! rendered as absent and its weight is redistributed by the oracle; it
//! never aborts a run.
//!
//! ```rust,ignore
//! let fetcher = FactorFetcher::new(Arc::new(HttpMarketApi::new(MarketApiConfig::default())?));
//! let reading = FactorReading::new(VOLATILITY, fetcher.volatility().await);
//! ```

pub mod analytics;
pub mod api;
pub mod fetchers;
pub mod model;
pub mod social;

pub use api::{HttpMarketApi, MarketApi, MarketApiConfig, MockMarketApi};
pub use fetchers::{FactorFetcher, SocialQuery};
pub use model::{
    DefiTvl, Dominance, EthVsBtc, MarketCapShare, MarketReference, Momentum, SentimentReference, Social, TokenBoard,
    TokenSnapshot, VolumeShare, Volatility,
};
pub use social::{MembitClient, MembitConfig, SocialApi};
