//! Error Types for Headline Scraping

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// A failed page visit
///
/// Per-site failures are logged by the collector and yield zero headlines
/// for that site; they never abort a batch.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("DevTools protocol error: {0}")]
    Protocol(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Nothing found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether another attempt (next site, next run) could succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Session(_) | Self::Navigation(_) | Self::Timeout(_) | Self::Network(_) | Self::WebSocket(_)
        )
    }
}
