//! # index-runner
//!
//! Run orchestration for the scored indices and the news monitor.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Credentials │   │   Factors    │   │   Prompt +   │   │  Supabase   │
//! │  + Session  │──▶│ + Headlines  │──▶│    Oracle    │──▶│     Row     │
//! │  (--cron)   │   │  (absorbing) │   │   (fatal)    │   │ (non-fatal) │
//! └─────────────┘   └──────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! Each index is an [`IndexDefinition`]; [`Pipeline`] drives any of them
//! through the same stages. The binaries in `src/bin` are thin wrappers
//! around [`app`].

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod indices;
pub mod news_monitor;
pub mod pipeline;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::RunArgs;
pub use config::{Credentials, Requirement};
pub use error::{Result, RunError};
pub use indices::{AltcoinSeason, FearGreed};
pub use news_monitor::{MonitorReport, NewsMonitor, SiteOutcome};
pub use pipeline::{Gathered, IndexDefinition, Pipeline, RunReport, Scored, Sources, Stage};
