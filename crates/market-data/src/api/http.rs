//! HTTP Market API
//!
//! CoinGecko, DefiLlama and Alternative.me over plain REST.

use std::time::Duration;

use async_trait::async_trait;
use index_core::FetchError;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{CoinMarket, FearGreedEntry, FetchResult, GlobalMarket, MarketApi, TvlPoint};

const COINGECKO: &str = "CoinGecko";
const DEFILLAMA: &str = "DefiLlama";
const ALTERNATIVE: &str = "Alternative.me";

/// Endpoints and credentials for the public market APIs
#[derive(Clone, Debug)]
pub struct MarketApiConfig {
    pub coingecko_url: String,

    /// Demo key sent as `x-cg-demo-api-key`; raises rate limits
    pub coingecko_key: Option<String>,

    pub defillama_url: String,
    pub alternative_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MarketApiConfig {
    fn default() -> Self {
        Self {
            coingecko_url: "https://api.coingecko.com".into(),
            coingecko_key: None,
            defillama_url: "https://api.llama.fi".into(),
            alternative_url: "https://api.alternative.me".into(),
            timeout_secs: 30,
        }
    }
}

impl MarketApiConfig {
    /// Point every source at one base URL (mock servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.coingecko_url.clone_from(&url);
        self.defillama_url.clone_from(&url);
        self.alternative_url = url;
        self
    }
}

/// Market API backed by the public REST endpoints
pub struct HttpMarketApi {
    client: reqwest::Client,
    config: MarketApiConfig,
}

#[derive(Deserialize)]
struct UsdValue<T> {
    usd: Option<T>,
}

impl<T> UsdValue<T> {
    fn into_inner(value: Option<Self>) -> Option<T> {
        value.and_then(|v| v.usd)
    }
}

#[derive(Deserialize)]
struct CoinResponse {
    market_data: Option<CoinMarketData>,
}

#[derive(Deserialize)]
struct CoinMarketData {
    current_price: Option<UsdValue<Decimal>>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d: Option<f64>,
    price_change_percentage_30d: Option<f64>,
    total_volume: Option<UsdValue<Decimal>>,
    market_cap: Option<UsdValue<Decimal>>,
    ath: Option<UsdValue<Decimal>>,
    ath_change_percentage: Option<UsdValue<f64>>,
}

#[derive(Deserialize)]
struct ChartResponse {
    prices: Vec<(f64, f64)>,
}

#[derive(Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Deserialize)]
struct GlobalData {
    market_cap_percentage: MarketCapPercentage,
    total_market_cap: UsdValue<Decimal>,
    total_volume: UsdValue<Decimal>,
    market_cap_change_percentage_24h_usd: f64,
}

#[derive(Deserialize)]
struct MarketCapPercentage {
    btc: f64,
    eth: Option<f64>,
}

#[derive(Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngEntry>,
}

#[derive(Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

impl HttpMarketApi {
    pub fn new(config: MarketApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn coingecko(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}{path}", self.config.coingecko_url.trim_end_matches('/')));
        match &self.config.coingecko_key {
            Some(key) => request.header("x-cg-demo-api-key", key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(source: &str, request: reqwest::RequestBuilder) -> FetchResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("{source}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                source_name: source.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::malformed(format!("{source}: {}", e.without_url())))
    }
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn coin(&self, id: &str) -> FetchResult<CoinMarket> {
        let path = format!(
            "/api/v3/coins/{id}?localization=false&tickers=false&community_data=false&developer_data=false"
        );
        let response: CoinResponse = Self::get_json(COINGECKO, self.coingecko(&path)).await?;
        let data = response
            .market_data
            .ok_or_else(|| FetchError::malformed(format!("{COINGECKO}: {id} has no market_data")))?;
        let price = UsdValue::into_inner(data.current_price)
            .ok_or_else(|| FetchError::malformed(format!("{COINGECKO}: {id} has no USD price")))?;

        Ok(CoinMarket {
            price,
            change_24h: data.price_change_percentage_24h,
            change_7d: data.price_change_percentage_7d,
            change_30d: data.price_change_percentage_30d,
            volume_24h: UsdValue::into_inner(data.total_volume),
            market_cap: UsdValue::into_inner(data.market_cap),
            ath: UsdValue::into_inner(data.ath),
            ath_change_pct: UsdValue::into_inner(data.ath_change_percentage),
        })
    }

    async fn daily_prices(&self, id: &str, days: u32) -> FetchResult<Vec<f64>> {
        let path = format!("/api/v3/coins/{id}/market_chart?vs_currency=usd&days={days}&interval=daily");
        let chart: ChartResponse = Self::get_json(COINGECKO, self.coingecko(&path)).await?;
        Ok(chart.prices.into_iter().map(|(_, price)| price).collect())
    }

    async fn global(&self) -> FetchResult<GlobalMarket> {
        let response: GlobalResponse = Self::get_json(COINGECKO, self.coingecko("/api/v3/global")).await?;
        let data = response.data;
        let total_market_cap = data
            .total_market_cap
            .usd
            .ok_or_else(|| FetchError::malformed(format!("{COINGECKO}: global has no USD market cap")))?;
        let total_volume = data
            .total_volume
            .usd
            .ok_or_else(|| FetchError::malformed(format!("{COINGECKO}: global has no USD volume")))?;

        Ok(GlobalMarket {
            btc_dominance: data.market_cap_percentage.btc,
            eth_dominance: data.market_cap_percentage.eth,
            total_market_cap,
            total_volume,
            market_cap_change_24h: data.market_cap_change_percentage_24h_usd,
        })
    }

    async fn chain_tvl_history(&self) -> FetchResult<Vec<TvlPoint>> {
        let url = format!("{}/v2/historicalChainTvl", self.config.defillama_url.trim_end_matches('/'));
        Self::get_json(DEFILLAMA, self.client.get(url)).await
    }

    async fn fear_greed(&self, limit: u32) -> FetchResult<Vec<FearGreedEntry>> {
        let url = format!("{}/fng/", self.config.alternative_url.trim_end_matches('/'));
        let response: FngResponse =
            Self::get_json(ALTERNATIVE, self.client.get(url).query(&[("limit", limit)])).await?;

        response
            .data
            .into_iter()
            .map(|entry| {
                let value = entry
                    .value
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| FetchError::malformed(format!("{ALTERNATIVE}: value {:?}", entry.value)))?;
                let timestamp = entry
                    .timestamp
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| FetchError::malformed(format!("{ALTERNATIVE}: timestamp {:?}", entry.timestamp)))?;
                Ok(FearGreedEntry {
                    value,
                    classification: entry.value_classification,
                    timestamp,
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "HttpMarketApi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, key: Option<&str>) -> HttpMarketApi {
        let mut config = MarketApiConfig::default().with_base_url(server.uri());
        config.coingecko_key = key.map(str::to_string);
        HttpMarketApi::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/global"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let mut config = MarketApiConfig::default().with_base_url(server.uri());
        config.timeout_secs = 1;
        let err = HttpMarketApi::new(config).unwrap().global().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_coin_market_with_demo_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/bitcoin"))
            .and(query_param("tickers", "false"))
            .and(header("x-cg-demo-api-key", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "market_data": {
                    "current_price": {"usd": 97500},
                    "price_change_percentage_24h": 2.5,
                    "price_change_percentage_7d": -1.25,
                    "total_volume": {"usd": 25000000000_u64},
                    "market_cap": {"usd": 1930000000000_u64},
                    "ath": {"usd": 108000},
                    "ath_change_percentage": {"usd": -9.72}
                }
            })))
            .mount(&server)
            .await;

        let coin = api(&server, Some("demo")).coin("bitcoin").await.unwrap();
        assert_eq!(coin.price, dec!(97500));
        assert_eq!(coin.change_24h, Some(2.5));
        assert_eq!(coin.change_30d, None);
        assert_eq!(coin.volume_24h, Some(dec!(25000000000)));
        assert_eq!(coin.ath_change_pct, Some(-9.72));
    }

    #[tokio::test]
    async fn test_http_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/global"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = api(&server, None).global().await.unwrap_err();
        assert_eq!(err, FetchError::Http { source_name: "CoinGecko".into(), status: 429 });
    }

    #[tokio::test]
    async fn test_missing_price_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/solana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"market_data": {}})))
            .mount(&server)
            .await;

        let err = api(&server, None).coin("solana").await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_daily_prices_drop_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/bitcoin/market_chart"))
            .and(query_param("days", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prices": [[1700000000000_u64, 100.0], [1700086400000_u64, 110.5]]
            })))
            .mount(&server)
            .await;

        let prices = api(&server, None).daily_prices("bitcoin", 30).await.unwrap();
        assert_eq!(prices, vec![100.0, 110.5]);
    }

    #[tokio::test]
    async fn test_fear_greed_parses_string_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fng/"))
            .and(query_param("limit", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"value": "45", "value_classification": "Fear", "timestamp": "1700000000"},
                    {"value": "52", "value_classification": "Neutral", "timestamp": "1699913600"}
                ]
            })))
            .mount(&server)
            .await;

        let entries = api(&server, None).fear_greed(7).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, 45);
        assert_eq!(entries[0].classification, "Fear");
        assert_eq!(entries[1].timestamp, 1_699_913_600);
    }

    #[tokio::test]
    async fn test_chain_tvl_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/historicalChainTvl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": 1700000000, "tvl": 50000000000.0},
                {"date": 1700086400, "tvl": 51000000000.0}
            ])))
            .mount(&server)
            .await;

        let points = api(&server, None).chain_tvl_history().await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].tvl, dec!(51000000000));
    }
}
