//! Error Types for Runs

use index_core::IndexError;
use thiserror::Error;

use crate::pipeline::Stage;

pub type Result<T> = std::result::Result<T, RunError>;

/// Failures that abort a run
///
/// Transient source failures never reach this type: they are absorbed by
/// the fetchers and the collector as absent factors or missing headlines.
#[derive(Error, Debug)]
pub enum RunError {
    /// A required environment variable is missing or empty
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    /// Operator input could not be read
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// A client could not be constructed
    #[error("Setup failed: {0}")]
    Setup(String),

    /// The oracle failed or broke its reply contract
    #[error("Scoring failed: {0}")]
    Scoring(#[from] IndexError),
}

impl RunError {
    /// Stage the run was in when it aborted
    pub const fn stage(&self) -> Stage {
        match self {
            Self::MissingCredential(_) | Self::Prompt(_) | Self::Setup(_) => Stage::Configuring,
            Self::Scoring(_) => Stage::Scoring,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential(name) => format!("{name} is not set. Add it to the environment or .env."),
            Self::Scoring(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_stage() {
        assert_eq!(RunError::MissingCredential("API_KEY").stage(), Stage::Configuring);
        assert_eq!(RunError::Scoring(IndexError::InvalidScore("150".into())).stage(), Stage::Scoring);
        assert_eq!(RunError::MissingCredential("API_KEY").to_string(), "API_KEY is not set");
    }
}
