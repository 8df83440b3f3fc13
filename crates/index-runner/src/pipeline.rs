//! Run Orchestration
//!
//! One scoring run moves through a fixed sequence of stages:
//!
//! ```text
//! Configuring ─▶ FetchingFactors ─▶ FetchingHeadlines ─▶ Scoring ─▶ Persisting ─▶ Done
//!      │                                                    │
//!      └────────────────────────▶ Abort ◀───────────────────┘
//! ```
//!
//! Fetch stages always complete, possibly with absent factors or fewer
//! headlines. Only a configuration failure or an oracle failure aborts, and
//! an aborted run persists nothing. A failed insert is logged and reported
//! as `saved: false`; the run still completes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use index_core::{assemble, ContextSection, FactorReading, Headline, IndexProfile, PersistedRow, ScoreResult, ScoringOracle};
use index_store::IndexStore;
use market_data::FactorFetcher;
use news_scraper::{BrowserProvider, HeadlineCollector, SessionConfig, SiteDescriptor, CRYPTO_SITES};
use uuid::Uuid;

use crate::error::Result;

/// Position of a run in its state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Configuring,
    FetchingFactors,
    FetchingHeadlines,
    Scoring,
    Persisting,
    Done,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::FetchingFactors => "fetching_factors",
            Self::FetchingHeadlines => "fetching_headlines",
            Self::Scoring => "scoring",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data sources an index reads its factors from
pub struct Sources {
    pub fetcher: FactorFetcher,

    /// Used for reference-page fallbacks
    pub browser: Arc<dyn BrowserProvider>,
    pub session: SessionConfig,
}

/// Factor readings plus whatever the index keeps for its row and summary
pub struct Gathered<F> {
    pub readings: Vec<FactorReading>,

    /// Unscored prompt sections
    pub context: Vec<ContextSection>,
    pub facts: F,
}

impl<F> Gathered<F> {
    pub fn available(&self) -> usize {
        self.readings.iter().filter(|r| r.is_available()).count()
    }
}

/// One composite index: its prompt profile, how it fetches its factors and
/// which raw columns it records
#[async_trait]
pub trait IndexDefinition: Send + Sync {
    /// Raw values kept from the fetch stage for the row and the summary
    type Facts: Send + Sync;

    fn profile(&self) -> &IndexProfile;

    /// Destination table
    fn table(&self) -> &'static str;

    /// Sites headlines are drawn from
    fn headline_pool(&self) -> &[SiteDescriptor] {
        &CRYPTO_SITES
    }

    /// Fetch every factor, sequentially and paced
    async fn gather(&self, sources: &Sources) -> Gathered<Self::Facts>;

    /// Add the index's raw snapshot columns
    fn columns(&self, row: PersistedRow, facts: &Self::Facts, result: &ScoreResult) -> PersistedRow;

    /// Extra summary lines, e.g. the BTC price
    fn highlights(&self, _facts: &Self::Facts) -> Vec<String> {
        Vec::new()
    }
}

/// A run that has its verdict but has not been persisted yet
pub struct Scored<F> {
    pub run_id: Uuid,
    pub result: ScoreResult,
    pub headlines: Vec<Headline>,
    gathered: Gathered<F>,
}

/// Outcome of a completed run
#[derive(Clone, Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub result: ScoreResult,
    pub headlines: Vec<Headline>,

    /// Factors that reached the prompt with data
    pub factors_available: usize,
    pub factors_total: usize,

    /// Whether the row was persisted
    pub saved: bool,
    pub highlights: Vec<String>,
}

/// Drives one index through its stages
pub struct Pipeline {
    sources: Sources,
    collector: HeadlineCollector,
    oracle: ScoringOracle,
    store: Arc<dyn IndexStore>,
}

fn enter(stage: Stage, run_id: Uuid) {
    tracing::info!(%run_id, %stage, "▶️ Stage");
}

impl Pipeline {
    pub fn new(sources: Sources, oracle: ScoringOracle, store: Arc<dyn IndexStore>) -> Self {
        let collector = HeadlineCollector::new(Arc::clone(&sources.browser), sources.session.clone());
        Self {
            sources,
            collector,
            oracle,
            store,
        }
    }

    /// Replace the default headline collector (target, timing)
    pub fn with_collector(mut self, collector: HeadlineCollector) -> Self {
        self.collector = collector;
        self
    }

    /// Every stage through Done
    pub async fn run<D: IndexDefinition>(&self, index: &D) -> Result<RunReport> {
        let scored = self.score(index).await?;
        Ok(self.persist(index, scored).await)
    }

    /// FetchingFactors through Scoring; an oracle failure aborts the run
    pub async fn score<D: IndexDefinition>(&self, index: &D) -> Result<Scored<D::Facts>> {
        let run_id = Uuid::new_v4();
        let profile = index.profile();
        tracing::info!(%run_id, index = profile.name, factors = profile.factors.len(), "🚀 Run started");

        enter(Stage::FetchingFactors, run_id);
        let gathered = index.gather(&self.sources).await;
        let factors_available = gathered.available();
        tracing::info!(available = factors_available, total = profile.factors.len(), "📊 Factors gathered");

        enter(Stage::FetchingHeadlines, run_id);
        let headlines = self.collector.collect(index.headline_pool()).await;

        enter(Stage::Scoring, run_id);
        let prompt = assemble(profile, &gathered.readings, &headlines, &gathered.context);
        tracing::debug!(chars = prompt.as_str().len(), "Prompt assembled");
        let result = match self.oracle.score(&prompt).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(%run_id, stage = %Stage::Scoring, error = %e, "❌ Scoring failed, nothing persisted");
                return Err(e.into());
            }
        };
        if profile.label_for(result.score) != Some(result.label.as_str()) {
            tracing::warn!(score = result.score, label = %result.label, "⚠️ Label does not match the score band");
        }

        Ok(Scored {
            run_id,
            result,
            headlines,
            gathered,
        })
    }

    /// Persisting through Done; a failed insert is reported, not raised
    pub async fn persist<D: IndexDefinition>(&self, index: &D, scored: Scored<D::Facts>) -> RunReport {
        let Scored {
            run_id,
            result,
            headlines,
            gathered,
        } = scored;
        let factors_available = gathered.available();

        enter(Stage::Persisting, run_id);
        let row = PersistedRow::new(index.table(), run_id, result.clone(), headlines.clone());
        let row = index.columns(row, &gathered.facts, &result);
        let saved = match self.store.append(&row).await {
            Ok(()) => {
                tracing::info!(table = %row.table, "💾 Row saved");
                true
            }
            Err(e) => {
                tracing::error!(%run_id, table = %row.table, error = %e, "❌ Failed to save row");
                false
            }
        };

        enter(Stage::Done, run_id);
        RunReport {
            run_id,
            result,
            headlines,
            factors_available,
            factors_total: index.profile().factors.len(),
            saved,
            highlights: index.highlights(&gathered.facts),
        }
    }
}
