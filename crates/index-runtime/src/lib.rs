//! # index-runtime
//!
//! Oracle providers for the market index scorers.
//!
//! ## Providers
//!
//! - **Gemini** (default): hosted `generateContent` API
//! - **Ollama** (feature `ollama`): local LLM inference
//!
//! ## Usage
//!
//! ```rust,ignore
//! use index_runtime::{GeminiConfig, OracleConfig};
//!
//! let provider = OracleConfig::Gemini(GeminiConfig::new(api_key)).into_provider()?;
//! let oracle = ScoringOracle::new(provider, GenerationOptions::scoring(0.5));
//! ```

use std::sync::Arc;

pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use gemini::{GeminiConfig, GeminiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use index_core::{Completion, GenerationOptions, IndexError, LlmProvider, Result};

/// Oracle backend selection and its settings
#[derive(Clone, Debug)]
pub enum OracleConfig {
    Gemini(GeminiConfig),

    #[cfg(feature = "ollama")]
    Ollama(OllamaConfig),
}

impl OracleConfig {
    /// Provider name as accepted in `ORACLE_PROVIDER`
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gemini(_) => "gemini",
            #[cfg(feature = "ollama")]
            Self::Ollama(_) => "ollama",
        }
    }

    pub fn into_provider(self) -> Result<Arc<dyn LlmProvider>> {
        match self {
            Self::Gemini(config) => Ok(Arc::new(GeminiProvider::new(config)?)),
            #[cfg(feature = "ollama")]
            Self::Ollama(config) => Ok(Arc::new(OllamaProvider::from_config(config))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_provider_uses_configured_model() {
        let config = OracleConfig::Gemini(GeminiConfig::new("k").with_model("gemini-2.5-pro"));
        assert_eq!(config.name(), "gemini");
        let provider = config.into_provider().unwrap();
        assert_eq!(provider.info().model, "gemini-2.5-pro");
    }
}
