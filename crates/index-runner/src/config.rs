//! Run Configuration
//!
//! Credentials and endpoints read from the environment (seeded from `.env`
//! by the binaries). A missing required variable aborts the run before any
//! network call is made.

#[cfg(feature = "ollama")]
use index_runtime::OllamaConfig;
use index_runtime::{GeminiConfig, OracleConfig};
use index_store::{SupabaseConfig, TelegramConfig};
use market_data::{MarketApiConfig, MembitConfig};
use news_scraper::BrowserCashConfig;

use crate::error::{Result, RunError};

/// Which binary is asking, and so which credentials are required
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Index scorers: browser, Supabase and the oracle selected by
    /// `ORACLE_PROVIDER`
    Scoring,

    /// News monitor: browser and Supabase
    Monitoring,
}

/// Validated credentials and client settings for one run
#[derive(Clone, Debug)]
pub struct Credentials {
    pub browser: BrowserCashConfig,
    pub supabase: SupabaseConfig,
    pub market: MarketApiConfig,

    /// `None` when `MEMBIT_API_KEY` is unset; the social factor is skipped
    pub membit: Option<MembitConfig>,

    /// `None` unless both Telegram variables are set
    pub telegram: Option<TelegramConfig>,

    /// Set for [`Requirement::Scoring`] only
    pub oracle: Option<OracleConfig>,
}

/// Oracle backend named by `ORACLE_PROVIDER` (`gemini` when unset)
fn oracle_config(get: &dyn Fn(&str) -> Option<String>) -> Result<OracleConfig> {
    let name = get("ORACLE_PROVIDER").map_or_else(|| "gemini".to_string(), |name| name.trim().to_ascii_lowercase());
    match name.as_str() {
        "gemini" => {
            let key = get("GEMINI_API_KEY").ok_or(RunError::MissingCredential("GEMINI_API_KEY"))?;
            let mut config = GeminiConfig::new(key);
            if let Some(model) = get("GEMINI_MODEL") {
                config = config.with_model(model);
            }
            Ok(OracleConfig::Gemini(config))
        }
        #[cfg(feature = "ollama")]
        "ollama" => {
            let mut config = OllamaConfig::default();
            if let Some(host) = get("OLLAMA_HOST") {
                config.host = host;
            }
            if let Some(port) = get("OLLAMA_PORT") {
                config.port = port
                    .trim()
                    .parse()
                    .map_err(|_| RunError::Setup(format!("OLLAMA_PORT is not a port number: {port}")))?;
            }
            if let Some(model) = get("OLLAMA_MODEL") {
                config.model = model;
            }
            Ok(OracleConfig::Ollama(config))
        }
        #[cfg(not(feature = "ollama"))]
        "ollama" => Err(RunError::Setup("ORACLE_PROVIDER=ollama needs a build with the `ollama` feature".into())),
        other => Err(RunError::Setup(format!("Unknown ORACLE_PROVIDER: {other}"))),
    }
}

impl Credentials {
    pub fn from_env(requirement: Requirement) -> Result<Self> {
        Self::from_lookup(requirement, |name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(requirement: Requirement, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(RunError::MissingCredential(name));

        let browser_key = required("API_KEY")?;
        let supabase_url = required("SUPABASE_URL")?;
        let supabase_key = required("SUPABASE_ANON_KEY")?;
        let oracle = match requirement {
            Requirement::Scoring => Some(oracle_config(&get)?),
            Requirement::Monitoring => None,
        };

        let mut browser = BrowserCashConfig::new(browser_key);
        if let Some(url) = get("BROWSER_API_URL") {
            browser = browser.with_base_url(url);
        }

        let membit = get("MEMBIT_API_KEY").map(|key| {
            let mut config = MembitConfig::new(key);
            if let Some(url) = get("MEMBIT_API_URL") {
                config.base_url = url;
            }
            config
        });

        let telegram = get("TELEGRAM_BOT_TOKEN")
            .zip(get("TELEGRAM_CHAT_ID"))
            .map(|(token, chat)| TelegramConfig::new(token, chat));

        Ok(Self {
            browser,
            supabase: SupabaseConfig::new(supabase_url, supabase_key),
            market: MarketApiConfig {
                coingecko_key: get("COINGECKO_API_KEY"),
                ..MarketApiConfig::default()
            },
            membit,
            telegram,
            oracle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    const BASE: [(&str, &str); 4] = [
        ("API_KEY", "bc-key"),
        ("SUPABASE_URL", "https://xyz.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("GEMINI_API_KEY", "gm-key"),
    ];

    #[test]
    fn test_required_credentials() {
        let env = vars(&BASE);
        let creds = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.browser.api_key, "bc-key");
        assert_eq!(creds.supabase.url, "https://xyz.supabase.co");
        assert!(creds.membit.is_none());
        assert!(creds.telegram.is_none());
        assert!(creds.market.coingecko_key.is_none());
    }

    #[test]
    fn test_missing_credential_aborts() {
        let env = vars(&BASE[..3]);
        let err = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, RunError::MissingCredential("GEMINI_API_KEY")));

        // The monitor never talks to the oracle
        assert!(Credentials::from_lookup(Requirement::Monitoring, |k| env.get(k).cloned()).is_ok());

        let env = vars(&[("API_KEY", "x"), ("SUPABASE_URL", "  ")]);
        let err = Credentials::from_lookup(Requirement::Monitoring, |k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, RunError::MissingCredential("SUPABASE_URL")));
    }

    #[test]
    fn test_optional_sources() {
        let mut env = vars(&BASE);
        env.extend(vars(&[
            ("MEMBIT_API_KEY", "mb"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("COINGECKO_API_KEY", "cg"),
            ("BROWSER_API_URL", "http://localhost:9000"),
        ]));
        let creds = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap();
        assert_eq!(creds.membit.map(|m| m.api_key).as_deref(), Some("mb"));
        // Chat id missing
        assert!(creds.telegram.is_none());
        assert_eq!(creds.market.coingecko_key.as_deref(), Some("cg"));
        assert_eq!(creds.browser.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_gemini_model_override() {
        let mut env = vars(&BASE);
        env.extend(vars(&[("GEMINI_MODEL", "gemini-2.5-pro")]));
        let creds = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap();
        let Some(OracleConfig::Gemini(config)) = creds.oracle else {
            panic!("expected the Gemini oracle");
        };
        assert_eq!(config.api_key, "gm-key");
        assert_eq!(config.model, "gemini-2.5-pro");

        let creds = Credentials::from_lookup(Requirement::Monitoring, |k| env.get(k).cloned()).unwrap();
        assert!(creds.oracle.is_none());
    }

    #[test]
    fn test_unknown_oracle_provider() {
        let mut env = vars(&BASE);
        env.extend(vars(&[("ORACLE_PROVIDER", "gpt")]));
        let err = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, RunError::Setup(msg) if msg.contains("gpt")));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn test_ollama_needs_no_gemini_key() {
        let env = vars(&[
            BASE[0],
            BASE[1],
            BASE[2],
            ("ORACLE_PROVIDER", "Ollama"),
            ("OLLAMA_MODEL", "qwen2.5"),
            ("OLLAMA_PORT", "11500"),
        ]);
        let creds = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap();
        let Some(OracleConfig::Ollama(config)) = creds.oracle else {
            panic!("expected the Ollama oracle");
        };
        assert_eq!(config.model, "qwen2.5");
        assert_eq!(config.port, 11500);
    }

    #[cfg(not(feature = "ollama"))]
    #[test]
    fn test_ollama_without_feature_is_a_setup_error() {
        let env = vars(&[BASE[0], BASE[1], BASE[2], ("ORACLE_PROVIDER", "ollama")]);
        let err = Credentials::from_lookup(Requirement::Scoring, |k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, RunError::Setup(msg) if msg.contains("`ollama` feature")));
    }
}
