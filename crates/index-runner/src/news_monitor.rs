//! News Monitor
//!
//! Visits a fixed site rotation, one browser session per site, and
//! publishes each site's newest link that has never been sent before.

use std::sync::Arc;
use std::time::Duration;

use index_core::Headline;
use index_store::{news_message, NewsEntry, NewsLedger, Notifier};
use news_scraper::collector::SITE_GAP;
use news_scraper::{HeadlineCollector, SiteDescriptor};

/// What happened at one site
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteOutcome {
    /// A new link was recorded (and announced when a notifier is set)
    Sent,

    /// Every link on the page was sent by an earlier run
    AlreadySent,

    /// The page had no headline candidates
    NothingFound,

    /// The visit or a ledger lookup failed
    Failed,
}

/// Totals for one monitor pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub total: usize,
    pub sent: usize,

    /// Ledger size before and after, when it could be read
    pub count_before: Option<u64>,
    pub count_after: Option<u64>,
}

impl MonitorReport {
    pub const fn skipped(&self) -> usize {
        self.total.saturating_sub(self.sent)
    }
}

/// Publishes fresh links from a site rotation
pub struct NewsMonitor {
    collector: HeadlineCollector,
    ledger: Arc<dyn NewsLedger>,
    notifier: Option<Arc<dyn Notifier>>,
    gap: Duration,
}

impl NewsMonitor {
    pub fn new(collector: HeadlineCollector, ledger: Arc<dyn NewsLedger>) -> Self {
        Self {
            collector,
            ledger,
            notifier: None,
            gap: SITE_GAP,
        }
    }

    /// Announce sent links; without a notifier they are only recorded
    pub fn with_notifier(mut self, notifier: Option<Arc<dyn Notifier>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    async fn count(&self) -> Option<u64> {
        match self.ledger.count().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "⚠️ Could not count stored news");
                None
            }
        }
    }

    /// First candidate whose link the ledger has not seen
    async fn first_unsent(&self, candidates: Vec<Headline>) -> Result<Option<Headline>, index_store::StoreError> {
        for candidate in candidates {
            if !self.ledger.contains(&candidate.link).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Scrape one site and publish its newest unsent link
    pub async fn check_site(&self, site: &SiteDescriptor) -> SiteOutcome {
        let candidates = match self.collector.scrape_site(site).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(site = site.name, error = %e, "⚠️ Site scrape failed");
                return SiteOutcome::Failed;
            }
        };
        tracing::info!(site = site.name, found = candidates.len(), "🔎 Candidates found");
        if candidates.is_empty() {
            return SiteOutcome::NothingFound;
        }

        let headline = match self.first_unsent(candidates).await {
            Ok(Some(headline)) => headline,
            Ok(None) => {
                tracing::info!(site = site.name, "⏭️ Everything already sent");
                return SiteOutcome::AlreadySent;
            }
            Err(e) => {
                tracing::warn!(site = site.name, error = %e, "⚠️ News lookup failed");
                return SiteOutcome::Failed;
            }
        };

        let entry = NewsEntry {
            site_name: site.name.to_string(),
            category: site.category.to_string(),
            title: headline.title.clone(),
            link: headline.link.clone(),
        };
        match self.ledger.record(&entry).await {
            Ok(true) => tracing::info!(site = site.name, title = %entry.title, "💾 News saved"),
            Ok(false) => {
                tracing::info!(site = site.name, link = %entry.link, "⏭️ Recorded concurrently, skipping");
                return SiteOutcome::AlreadySent;
            }
            Err(e) => tracing::error!(site = site.name, error = %e, "❌ Failed to save news"),
        }

        if let Some(notifier) = &self.notifier {
            match notifier.notify(&news_message(site.name, &entry.title, &entry.link)).await {
                Ok(()) => tracing::info!(site = site.name, "📨 Sent to Telegram"),
                Err(e) => tracing::warn!(site = site.name, error = %e, "⚠️ Telegram delivery failed"),
            }
        }
        SiteOutcome::Sent
    }

    /// One pass over `sites`, paced by the site gap
    pub async fn run(&self, sites: &[SiteDescriptor]) -> MonitorReport {
        let count_before = self.count().await;
        tracing::info!(sites = sites.len(), stored = ?count_before, "🚀 News monitor started");

        let mut sent = 0;
        for (i, site) in sites.iter().enumerate() {
            if i > 0 && !self.gap.is_zero() {
                tokio::time::sleep(self.gap).await;
            }
            tracing::info!(site = site.name, n = i + 1, total = sites.len(), "🌐 Checking site");
            if self.check_site(site).await == SiteOutcome::Sent {
                sent += 1;
            }
        }

        MonitorReport {
            total: sites.len(),
            sent,
            count_before,
            count_after: self.count().await,
        }
    }
}
