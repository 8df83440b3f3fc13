//! Factor Records
//!
//! Normalized readings produced by the fetchers. Each implements
//! [`FactorRecord`] so the prompt assembler can render it.

use chrono::{DateTime, NaiveDate, Utc};
use index_core::format::{round2, signed_pct, usd, usd_billions, usd_trillions};
use index_core::{ContextSection, FactorRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::Value;

use crate::api::{CoinMarket, FearGreedEntry};

pub(crate) fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// BTC 30-day price volatility
#[derive(Clone, Debug, Serialize)]
pub struct Volatility {
    /// Std dev of daily returns, percent
    pub volatility: f64,

    /// Max drawdown over the window, percent
    pub max_drawdown: f64,

    /// First to last sample, percent
    pub change_30d: f64,

    /// Last 7 prices rounded to whole dollars
    pub recent_prices: Vec<f64>,
}

impl FactorRecord for Volatility {
    fn describe(&self) -> Vec<String> {
        let prices: Vec<String> = self.recent_prices.iter().map(|p| usd(*p)).collect();
        vec![
            format!("30-day Volatility (Std Dev of daily returns): {}%", self.volatility),
            format!("Max Drawdown in last 30 days: {}%", self.max_drawdown),
            format!("30-day Price Change: {}", signed_pct(self.change_30d)),
            format!("Recent 7-day prices: {}", prices.join(" → ")),
        ]
    }
}

/// BTC price momentum and volume
#[derive(Clone, Debug, Serialize)]
pub struct Momentum {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub change_24h: f64,
    pub change_7d: f64,
    pub change_30d: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume_24h: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub market_cap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ath: Decimal,

    /// Percent distance from the all-time high
    pub ath_change_pct: f64,
}

impl From<CoinMarket> for Momentum {
    /// Missing sub-fields default to zero
    fn from(coin: CoinMarket) -> Self {
        Self {
            price: coin.price,
            change_24h: round2(coin.change_24h.unwrap_or_default()),
            change_7d: round2(coin.change_7d.unwrap_or_default()),
            change_30d: round2(coin.change_30d.unwrap_or_default()),
            volume_24h: coin.volume_24h.unwrap_or_default(),
            market_cap: coin.market_cap.unwrap_or_default(),
            ath: coin.ath.unwrap_or_default(),
            ath_change_pct: round2(coin.ath_change_pct.unwrap_or_default()),
        }
    }
}

impl FactorRecord for Momentum {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("Current BTC Price: {}", usd(money(self.price))),
            format!("24h Change: {}", signed_pct(self.change_24h)),
            format!("7d Change: {}", signed_pct(self.change_7d)),
            format!("30d Change: {}", signed_pct(self.change_30d)),
            format!("24h Volume: {}", usd_billions(money(self.volume_24h))),
            format!("Market Cap: {}", usd_trillions(money(self.market_cap))),
            format!(
                "ATH (All-Time High): {} ({}% from ATH)",
                usd(money(self.ath)),
                self.ath_change_pct
            ),
        ]
    }
}

/// One token's market snapshot for per-token scoring
#[derive(Clone, Debug, Serialize)]
pub struct TokenSnapshot {
    #[serde(skip)]
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub change_24h: f64,
    pub change_7d: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume_24h: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub market_cap: Decimal,
}

impl TokenSnapshot {
    pub fn from_coin(symbol: impl Into<String>, coin: &CoinMarket) -> Self {
        Self {
            symbol: symbol.into(),
            price: coin.price,
            change_24h: round2(coin.change_24h.unwrap_or_default()),
            change_7d: round2(coin.change_7d.unwrap_or_default()),
            volume_24h: coin.volume_24h.unwrap_or_default(),
            market_cap: coin.market_cap.unwrap_or_default(),
        }
    }

    pub fn from_momentum(symbol: impl Into<String>, momentum: &Momentum) -> Self {
        Self {
            symbol: symbol.into(),
            price: momentum.price,
            change_24h: momentum.change_24h,
            change_7d: momentum.change_7d,
            volume_24h: momentum.volume_24h,
            market_cap: momentum.market_cap,
        }
    }
}

/// Multi-token market data, in fetch order
#[derive(Clone, Debug, Default)]
pub struct TokenBoard {
    pub tokens: Vec<TokenSnapshot>,
}

impl TokenBoard {
    pub fn push(&mut self, token: TokenSnapshot) {
        self.tokens.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Unscored prompt section used for per-token scoring
    pub fn context_section(&self) -> ContextSection {
        self.tokens.iter().fold(
            ContextSection::new("MULTI-TOKEN MARKET DATA (for per-token scoring)"),
            |section, token| {
                section
                    .line(format!("--- {} ---", token.symbol))
                    .line(format!("- Price: {}", usd(money(token.price))))
                    .line(format!("- 24h: {}", signed_pct(token.change_24h)))
                    .line(format!("- 7d: {}", signed_pct(token.change_7d)))
                    .line(format!("- Volume: {}", usd_billions(money(token.volume_24h))))
                    .line(format!("- Market Cap: {}", usd_billions(money(token.market_cap))))
            },
        )
    }

    /// `{symbol: {...}}` object for the persisted row
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.tokens
                .iter()
                .map(|token| (token.symbol.clone(), serde_json::to_value(token).unwrap_or(Value::Null)))
                .collect(),
        )
    }
}

/// BTC dominance and whole-market aggregates
#[derive(Clone, Debug, Serialize)]
pub struct Dominance {
    pub btc_dominance: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_market_cap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_volume: Decimal,
    pub market_cap_change_24h: f64,
}

impl FactorRecord for Dominance {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("BTC Dominance: {}%", self.btc_dominance),
            format!("Total Crypto Market Cap: {}", usd_trillions(money(self.total_market_cap))),
            format!("Total 24h Volume: {}", usd_billions(money(self.total_volume))),
            format!("Market Cap Change 24h: {}", signed_pct(self.market_cap_change_24h)),
        ]
    }
}

/// Social media digest from Membit
#[derive(Clone, Debug, Serialize)]
pub struct Social {
    pub cluster_text: String,
    pub post_text: String,
    pub has_data: bool,
}

impl FactorRecord for Social {
    fn describe(&self) -> Vec<String> {
        let mut lines = vec!["Source: Twitter/X data via Membit API".to_string()];
        if !self.cluster_text.is_empty() {
            lines.push(format!("Trending Clusters:\n{}", self.cluster_text));
        }
        if !self.post_text.is_empty() {
            lines.push(format!("Recent Posts:\n{}", self.post_text));
        }
        lines
    }

    fn is_usable(&self) -> bool {
        self.has_data
    }
}

/// Classify a fear & greed value the way the public index does
pub const fn fear_greed_label(score: u8) -> &'static str {
    match score {
        0..=25 => "Extreme Fear",
        26..=45 => "Fear",
        46..=55 => "Neutral",
        56..=75 => "Greed",
        _ => "Extreme Greed",
    }
}

/// One day of the public sentiment index
#[derive(Clone, Debug, Serialize)]
pub struct SentimentDay {
    pub date: NaiveDate,
    pub score: u8,
    pub label: String,
}

/// Industry sentiment reference (Alternative.me)
#[derive(Clone, Debug, Serialize)]
pub struct SentimentReference {
    pub current_score: u8,
    pub current_label: String,

    /// Newest first
    pub history: Vec<SentimentDay>,
}

impl SentimentReference {
    /// Build from API entries (newest first); `None` when empty
    pub fn from_entries(entries: &[FearGreedEntry]) -> Option<Self> {
        let current = entries.first()?;
        let history = entries
            .iter()
            .map(|entry| SentimentDay {
                date: DateTime::<Utc>::from_timestamp(entry.timestamp, 0)
                    .map_or_else(|| Utc::now().date_naive(), |at| at.date_naive()),
                score: entry.value,
                label: entry.classification.clone(),
            })
            .collect();

        Some(Self {
            current_score: current.value,
            current_label: current.classification.clone(),
            history,
        })
    }

    /// Single-day reference from a scraped page value
    pub fn from_scraped(score: u8, today: NaiveDate) -> Self {
        let label = fear_greed_label(score).to_string();
        Self {
            current_score: score,
            current_label: label.clone(),
            history: vec![SentimentDay { date: today, score, label }],
        }
    }

    /// Rounded mean of the history
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn average(&self) -> u8 {
        if self.history.is_empty() {
            return self.current_score;
        }
        let sum: u32 = self.history.iter().map(|day| u32::from(day.score)).sum();
        (f64::from(sum) / self.history.len() as f64).round() as u8
    }
}

impl FactorRecord for SentimentReference {
    fn describe(&self) -> Vec<String> {
        let history: Vec<String> = self
            .history
            .iter()
            .map(|day| format!("{}: {} ({})", day.date.format("%Y-%m-%d"), day.score, day.label))
            .collect();
        vec![
            "Alternative.me Fear & Greed Index (industry standard):".to_string(),
            format!("Current Score: {} ({})", self.current_score, self.current_label),
            format!("7-day History: {}", history.join(", ")),
            format!("7-day Average: {}", self.average()),
        ]
    }
}

/// ETH performance relative to BTC
#[derive(Clone, Debug, Serialize)]
pub struct EthVsBtc {
    #[serde(with = "rust_decimal::serde::float")]
    pub eth_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub btc_price: Decimal,
    pub eth_24h: f64,
    pub btc_24h: f64,
    pub eth_7d: f64,
    pub btc_7d: f64,
    pub eth_30d: f64,
    pub btc_30d: f64,

    /// ETH change minus BTC change; positive favors altcoins
    pub outperform_24h: f64,
    pub outperform_7d: f64,
    pub outperform_30d: f64,
}

impl EthVsBtc {
    pub fn new(eth: &CoinMarket, btc: &CoinMarket) -> Self {
        let diff = |a: Option<f64>, b: Option<f64>| round2(a.unwrap_or_default() - b.unwrap_or_default());
        Self {
            eth_price: eth.price,
            btc_price: btc.price,
            eth_24h: round2(eth.change_24h.unwrap_or_default()),
            btc_24h: round2(btc.change_24h.unwrap_or_default()),
            eth_7d: round2(eth.change_7d.unwrap_or_default()),
            btc_7d: round2(btc.change_7d.unwrap_or_default()),
            eth_30d: round2(eth.change_30d.unwrap_or_default()),
            btc_30d: round2(btc.change_30d.unwrap_or_default()),
            outperform_24h: diff(eth.change_24h, btc.change_24h),
            outperform_7d: diff(eth.change_7d, btc.change_7d),
            outperform_30d: diff(eth.change_30d, btc.change_30d),
        }
    }
}

impl FactorRecord for EthVsBtc {
    fn describe(&self) -> Vec<String> {
        vec![
            format!(
                "ETH Price: {} | BTC Price: {}",
                usd(money(self.eth_price)),
                usd(money(self.btc_price))
            ),
            format!("ETH 24h: {} | BTC 24h: {}", signed_pct(self.eth_24h), signed_pct(self.btc_24h)),
            format!("ETH 7d: {} | BTC 7d: {}", signed_pct(self.eth_7d), signed_pct(self.btc_7d)),
            format!("ETH 30d: {} | BTC 30d: {}", signed_pct(self.eth_30d), signed_pct(self.btc_30d)),
            format!(
                "ETH Outperformance vs BTC: 24h {} | 7d {} | 30d {}",
                signed_pct(self.outperform_24h),
                signed_pct(self.outperform_7d),
                signed_pct(self.outperform_30d)
            ),
        ]
    }
}

/// Altcoin share of total market cap
#[derive(Clone, Debug, Serialize)]
pub struct MarketCapShare {
    pub btc_dominance: f64,
    pub eth_dominance: Option<f64>,

    /// `100 - btc_dominance`
    pub altcoin_share: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_market_cap: Decimal,
    pub market_cap_change_24h: f64,
}

impl MarketCapShare {
    /// Total market cap scaled by the altcoin share
    pub fn altcoin_market_cap(&self) -> Decimal {
        let share = Decimal::try_from(self.altcoin_share).unwrap_or_default();
        (self.total_market_cap * share / Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl FactorRecord for MarketCapShare {
    fn describe(&self) -> Vec<String> {
        let eth = self
            .eth_dominance
            .map_or_else(|| "N/A".to_string(), |d| format!("{d}%"));
        vec![
            format!("BTC Dominance: {}%", self.btc_dominance),
            format!("ETH Dominance: {eth}"),
            format!("Altcoin Share (100% - BTC): {}%", self.altcoin_share),
            format!("Total Crypto Market Cap: {}", usd_trillions(money(self.total_market_cap))),
            format!("Market Cap 24h Change: {}", signed_pct(self.market_cap_change_24h)),
        ]
    }
}

/// Total DeFi TVL growth
#[derive(Clone, Debug, Serialize)]
pub struct DefiTvl {
    #[serde(with = "rust_decimal::serde::float")]
    pub current_tvl: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tvl_30d_ago: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tvl_7d_ago: Decimal,
    pub growth_7d: f64,
    pub growth_30d: f64,
}

impl FactorRecord for DefiTvl {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("Current Total DeFi TVL: {}", usd_billions(money(self.current_tvl))),
            format!("7-day Growth: {}", signed_pct(self.growth_7d)),
            format!("30-day Growth: {}", signed_pct(self.growth_30d)),
        ]
    }
}

/// Altcoin share of 24h trading volume
#[derive(Clone, Debug, Serialize)]
pub struct VolumeShare {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub btc_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub altcoin_volume: Decimal,
    pub altcoin_volume_share: f64,
}

impl FactorRecord for VolumeShare {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("Total 24h Volume: {}", usd_billions(money(self.total_volume))),
            format!("BTC Volume: {}", usd_billions(money(self.btc_volume))),
            format!("Altcoin Volume: {}", usd_billions(money(self.altcoin_volume))),
            format!("Altcoin Volume Share: {}%", self.altcoin_volume_share),
        ]
    }
}

/// Classify a third-party altcoin season value
pub const fn altcoin_season_label(score: u8) -> &'static str {
    match score {
        0..=25 => "Bitcoin Season",
        26..=50 => "Mostly Bitcoin",
        51..=75 => "Mostly Altcoins",
        _ => "Altcoin Season",
    }
}

/// Third-party altcoin season index used as a cross-reference
#[derive(Clone, Debug, Serialize)]
pub struct MarketReference {
    pub source: String,
    pub score: u8,
    pub label: String,
}

impl MarketReference {
    pub fn new(source: impl Into<String>, score: u8) -> Self {
        Self {
            source: source.into(),
            score,
            label: altcoin_season_label(score).to_string(),
        }
    }
}

impl FactorRecord for MarketReference {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("Source: {}", self.source),
            format!("Altcoin Season Index Score: {} ({})", self.score, self.label),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coin(price: Decimal, change_24h: f64, change_7d: f64) -> CoinMarket {
        CoinMarket {
            price,
            change_24h: Some(change_24h),
            change_7d: Some(change_7d),
            change_30d: None,
            volume_24h: Some(dec!(2_500_000_000)),
            market_cap: None,
            ath: None,
            ath_change_pct: None,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(fear_greed_label(25), "Extreme Fear");
        assert_eq!(fear_greed_label(26), "Fear");
        assert_eq!(fear_greed_label(55), "Neutral");
        assert_eq!(fear_greed_label(76), "Extreme Greed");
        assert_eq!(altcoin_season_label(50), "Mostly Bitcoin");
        assert_eq!(altcoin_season_label(80), "Altcoin Season");
    }

    #[test]
    fn test_eth_outperformance() {
        let eth_vs_btc = EthVsBtc::new(&coin(dec!(3450), 3.0, 10.0), &coin(dec!(97500), 1.0, 12.5));
        assert!((eth_vs_btc.outperform_24h - 2.0).abs() < 1e-9);
        assert!((eth_vs_btc.outperform_7d + 2.5).abs() < 1e-9);
        assert!(eth_vs_btc.outperform_30d.abs() < f64::EPSILON);
        assert!(eth_vs_btc.describe()[4].contains("24h +2.00% | 7d -2.50%"));
    }

    #[test]
    fn test_sentiment_average_and_history() {
        let entries = [
            FearGreedEntry { value: 60, classification: "Greed".into(), timestamp: 1_700_000_000 },
            FearGreedEntry { value: 51, classification: "Neutral".into(), timestamp: 1_699_913_600 },
        ];
        let reference = SentimentReference::from_entries(&entries).unwrap();
        assert_eq!(reference.current_score, 60);
        assert_eq!(reference.average(), 56);
        let lines = reference.describe();
        assert_eq!(lines[1], "Current Score: 60 (Greed)");
        assert!(lines[2].starts_with("7-day History: 2023-11-14: 60 (Greed)"));
        assert!(SentimentReference::from_entries(&[]).is_none());
    }

    #[test]
    fn test_scraped_sentiment() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let reference = SentimentReference::from_scraped(40, today);
        assert_eq!(reference.current_label, "Fear");
        assert_eq!(reference.history.len(), 1);
    }

    #[test]
    fn test_social_without_data_is_unusable() {
        let social = Social { cluster_text: String::new(), post_text: "short".into(), has_data: false };
        assert!(!social.is_usable());
    }

    #[test]
    fn test_altcoin_market_cap() {
        let share = MarketCapShare {
            btc_dominance: 60.0,
            eth_dominance: Some(12.0),
            altcoin_share: 40.0,
            total_market_cap: dec!(3_000_000_000_000),
            market_cap_change_24h: 0.0,
        };
        assert_eq!(share.altcoin_market_cap(), dec!(1_200_000_000_000));
    }

    #[test]
    fn test_token_board() {
        let mut board = TokenBoard::default();
        board.push(TokenSnapshot::from_coin("ETH", &coin(dec!(3450), 1.8, 6.2)));
        let section = board.context_section();
        assert_eq!(section.lines[0], "--- ETH ---");
        assert_eq!(section.lines[1], "- Price: $3,450");
        assert_eq!(board.to_json()["ETH"]["change_24h"], serde_json::json!(1.8));
        assert_eq!(board.to_json()["ETH"]["price"], serde_json::json!(3450.0));
    }
}
