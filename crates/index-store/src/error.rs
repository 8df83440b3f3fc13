//! Storage Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence and delivery errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the request
    #[error("Store error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Unique constraint hit; the row already exists
    #[error("Duplicate row: {0}")]
    Duplicate(String),

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Telegram answered `ok: false`
    #[error("Telegram error: {0}")]
    Telegram(String),
}

impl StoreError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(StoreError::Http { status: 503, message: "down".into() }.is_retryable());
        assert!(!StoreError::Http { status: 400, message: "bad column".into() }.is_retryable());
        assert!(!StoreError::Duplicate("news_link_key".into()).is_retryable());
        assert!(StoreError::Duplicate("news_link_key".into()).is_duplicate());
    }
}
