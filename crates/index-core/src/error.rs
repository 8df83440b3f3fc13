//! Error Types

use thiserror::Error;

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that abort a scoring run or surface from the oracle seam
#[derive(Error, Debug)]
pub enum IndexError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Oracle reply did not contain a JSON object
    #[error("No JSON object found in oracle reply")]
    NoJsonFound,

    /// Oracle score missing, non-numeric or outside [0, 100]
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// Reply JSON did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl IndexError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_)
        )
    }

    /// Whether the oracle answered but broke the reply contract
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::NoJsonFound | Self::InvalidScore(_) | Self::Parse(_)
        )
    }

    /// Convert to an operator-facing message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The scoring service returned an error: {msg}"),
            Self::ProviderUnavailable(_) => "The scoring service is currently unavailable.".into(),
            Self::RateLimited(_) => "The scoring service is rate limiting requests.".into(),
            Self::Auth(_) => "Scoring service authentication failed. Check GEMINI_API_KEY.".into(),
            Self::NoJsonFound => "The scoring service reply contained no JSON result.".into(),
            Self::InvalidScore(score) => format!("The scoring service returned an invalid score: {score}"),
            Self::Config(msg) => format!("Configuration error: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for IndexError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Why a single factor could not be read
///
/// Never aborts a run: the assembler renders a placeholder for the factor
/// and the oracle redistributes its weight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Source answered with a non-2xx status
    #[error("{source_name} returned HTTP {status}")]
    Http { source_name: String, status: u16 },

    /// Transport failure (DNS, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Payload did not have the expected shape
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Source answered but had nothing usable
    #[error("No data: {0}")]
    Unavailable(String),

    /// Source not configured for this run
    #[error("Skipped: {0}")]
    Skipped(String),
}

impl FetchError {
    pub fn malformed(what: impl Into<String>) -> Self {
        Self::Malformed(what.into())
    }

    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::Unavailable(what.into())
    }
}
