//! Mock Market API
//!
//! For testing and dry runs. Returns realistic static market data; any
//! source can be switched off to exercise the absent-factor path.

use std::collections::HashSet;

use async_trait::async_trait;
use index_core::FetchError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{CoinMarket, FearGreedEntry, FetchResult, GlobalMarket, MarketApi, TvlPoint};

/// Mock market API with static data
#[derive(Default)]
pub struct MockMarketApi {
    failing: HashSet<&'static str>,
}

impl MockMarketApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make one call fail with HTTP 503
    ///
    /// Names: `coin`, `daily_prices`, `global`, `chain_tvl_history`, `fear_greed`.
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    fn check(&self, call: &'static str) -> FetchResult<()> {
        if self.failing.contains(call) {
            Err(FetchError::Http {
                source_name: "MockMarket".into(),
                status: 503,
            })
        } else {
            Ok(())
        }
    }

    /// (price, 24h, 7d, 30d, volume, market cap)
    fn base_coin(id: &str) -> Option<(Decimal, f64, f64, f64, Decimal, Decimal)> {
        match id {
            "bitcoin" => Some((dec!(97500), 2.5, 4.1, 8.3, dec!(25_000_000_000), dec!(1_930_000_000_000))),
            "ethereum" => Some((dec!(3450), 1.8, 6.2, 12.4, dec!(15_000_000_000), dec!(415_000_000_000))),
            "solana" => Some((dec!(195), 4.2, 9.8, 15.0, dec!(3_000_000_000), dec!(93_000_000_000))),
            "binancecoin" => Some((dec!(690), 0.7, 1.1, 3.5, dec!(1_800_000_000), dec!(100_000_000_000))),
            _ => None,
        }
    }
}

#[async_trait]
impl MarketApi for MockMarketApi {
    async fn coin(&self, id: &str) -> FetchResult<CoinMarket> {
        self.check("coin")?;
        let (price, change_24h, change_7d, change_30d, volume, market_cap) =
            Self::base_coin(id).ok_or_else(|| FetchError::unavailable(format!("unknown coin {id}")))?;

        Ok(CoinMarket {
            price,
            change_24h: Some(change_24h),
            change_7d: Some(change_7d),
            change_30d: Some(change_30d),
            volume_24h: Some(volume),
            market_cap: Some(market_cap),
            ath: Some(price * dec!(1.1)),
            ath_change_pct: Some(-9.09),
        })
    }

    async fn daily_prices(&self, _id: &str, days: u32) -> FetchResult<Vec<f64>> {
        self.check("daily_prices")?;
        // Gentle uptrend with one dip
        Ok((0..=days)
            .map(|day| {
                let base = 90_000.0 + f64::from(day) * 250.0;
                if day == days / 2 { base * 0.95 } else { base }
            })
            .collect())
    }

    async fn global(&self) -> FetchResult<GlobalMarket> {
        self.check("global")?;
        Ok(GlobalMarket {
            btc_dominance: 57.4,
            eth_dominance: Some(12.1),
            total_market_cap: dec!(3_360_000_000_000),
            total_volume: dec!(110_000_000_000),
            market_cap_change_24h: 1.9,
        })
    }

    async fn chain_tvl_history(&self) -> FetchResult<Vec<TvlPoint>> {
        self.check("chain_tvl_history")?;
        Ok((0..40_i64)
            .map(|day| TvlPoint {
                date: 1_700_000_000 + day * 86_400,
                tvl: dec!(100_000_000_000) + Decimal::from(day) * dec!(500_000_000),
            })
            .collect())
    }

    async fn fear_greed(&self, limit: u32) -> FetchResult<Vec<FearGreedEntry>> {
        self.check("fear_greed")?;
        let values = [60_u8, 58, 55, 52, 49, 47, 50];
        Ok(values
            .iter()
            .zip(0_i64..)
            .take(limit as usize)
            .map(|(&value, day)| FearGreedEntry {
                value,
                classification: if value > 55 { "Greed" } else { "Neutral" }.into(),
                timestamp: 1_700_000_000 - day * 86_400,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "MockMarket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_market() {
        let api = MockMarketApi::new();

        let btc = api.coin("bitcoin").await.unwrap();
        assert_eq!(btc.price, dec!(97500));
        assert_eq!(api.fear_greed(7).await.unwrap().len(), 7);
        assert_eq!(api.daily_prices("bitcoin", 30).await.unwrap().len(), 31);
    }

    #[tokio::test]
    async fn test_failing_call() {
        let api = MockMarketApi::new().failing("global");
        assert!(api.global().await.is_err());
        assert!(api.coin("bitcoin").await.is_ok());
        assert!(api.coin("notreal").await.is_err());
    }
}
