//! # index-core
//!
//! Core model for AI-scored market indices.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │   Factor     │   │   Prompt     │   │   Scoring    │   │  Persisted  │
//! │  Readings    │──▶│  Assembler   │──▶│   Oracle     │──▶│     Row     │
//! │ (+Headlines) │   │  (pure fn)   │   │ (LlmProvider)│   │             │
//! └──────────────┘   └──────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Gemini, Ollama or any
//! other backend without changing the scoring pipeline.

pub mod error;
pub mod factor;
pub mod format;
pub mod headline;
pub mod oracle;
pub mod prompt;
pub mod provider;
pub mod record;
pub mod score;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FetchError, IndexError, Result};
pub use factor::{FactorReading, FactorRecord, FactorSpec};
pub use headline::{Headline, HeadlineSet};
pub use oracle::ScoringOracle;
pub use prompt::{assemble, ContextSection, IndexProfile, ScoreBand, ScoringPrompt};
pub use provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
pub use record::PersistedRow;
pub use score::{parse_reply, ScoreResult, TokenScore};
