//! Headline Collector
//!
//! Shuffles a site pool, scrapes the first `target` sites and, if that left
//! the batch short, keeps drawing from the remaining sites until the target
//! is met or the pool runs out. Each site contributes at most one headline.

use std::sync::Arc;
use std::time::Duration;

use index_core::headline::sort_newest_first;
use index_core::{Headline, HeadlineSet};
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::extract::extract_headlines;
use crate::rules::SiteDescriptor;
use crate::session::{BrowserProvider, PageVisit, SessionConfig, visit_page};

/// Headlines wanted per scoring run
pub const TARGET_HEADLINES: usize = 5;
/// Pause between consecutive site visits
pub const SITE_GAP: Duration = Duration::from_secs(3);
/// Pause after scrolling before the page is read
pub const SITE_SETTLE: Duration = Duration::from_millis(800);

/// Scrapes news sites through one browser session each
pub struct HeadlineCollector {
    browser: Arc<dyn BrowserProvider>,
    session: SessionConfig,
    target: usize,
    gap: Duration,
    settle: Duration,
}

impl HeadlineCollector {
    pub fn new(browser: Arc<dyn BrowserProvider>, session: SessionConfig) -> Self {
        Self {
            browser,
            session,
            target: TARGET_HEADLINES,
            gap: SITE_GAP,
            settle: SITE_SETTLE,
        }
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Override the inter-site gap and page settle time
    pub fn with_timing(mut self, gap: Duration, settle: Duration) -> Self {
        self.gap = gap;
        self.settle = settle;
        self
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    async fn pause(&self) {
        if !self.gap.is_zero() {
            tokio::time::sleep(self.gap).await;
        }
    }

    /// All candidates on one site, newest first
    pub async fn scrape_site(&self, site: &SiteDescriptor) -> Result<Vec<Headline>> {
        let visit = PageVisit::new(site.url).wait_for(site.wait_for).settle(self.settle);
        let html = visit_page(self.browser.as_ref(), &self.session, &visit).await?;

        let mut candidates = extract_headlines(site, &html)?;
        tracing::debug!(site = site.name, candidates = candidates.len(), "Page extracted");
        sort_newest_first(&mut candidates);
        Ok(candidates)
    }

    /// Take the newest headline of `site` not already in `batch`
    async fn take_one(&self, site: &SiteDescriptor, batch: &mut HeadlineSet) {
        match self.scrape_site(site).await {
            Ok(candidates) => match candidates.into_iter().find(|h| !batch.contains_link(&h.link)) {
                Some(headline) => {
                    tracing::info!(site = site.name, title = %headline.title, "📰 Headline collected");
                    batch.insert(headline);
                }
                None => tracing::warn!(site = site.name, "⚠️ No headline found"),
            },
            Err(e) => tracing::warn!(site = site.name, error = %e, "⚠️ Site scrape failed"),
        }
    }

    /// Collect from `pool` in random order
    pub async fn collect(&self, pool: &[SiteDescriptor]) -> Vec<Headline> {
        let mut order = pool.to_vec();
        order.shuffle(&mut rand::thread_rng());
        self.collect_ordered(&order).await
    }

    /// Collect from `sites` in the given order
    ///
    /// The first `target` sites are always attempted; the rest are backups
    /// tried one by one only while the batch is short.
    pub async fn collect_ordered(&self, sites: &[SiteDescriptor]) -> Vec<Headline> {
        let split = self.target.min(sites.len());
        let (primary, backup) = sites.split_at(split);
        tracing::info!(
            primary = ?primary.iter().map(|s| s.name).collect::<Vec<_>>(),
            backup = ?backup.iter().map(|s| s.name).collect::<Vec<_>>(),
            "🗞️ Collecting headlines"
        );

        let mut batch = HeadlineSet::new();
        for (i, site) in primary.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            self.take_one(site, &mut batch).await;
        }

        if batch.len() < self.target && !backup.is_empty() {
            tracing::info!(have = batch.len(), target = self.target, "🔁 Rotating to backup sites");
            for site in backup {
                if batch.len() >= self.target {
                    break;
                }
                self.pause().await;
                self.take_one(site, &mut batch).await;
            }
        }

        tracing::info!(collected = batch.len(), target = self.target, "✅ Headlines collected");
        batch.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, ExtractionRule, LinkRule};
    use crate::session::StaticBrowser;

    const fn site(name: &'static str, url: &'static str) -> SiteDescriptor {
        SiteDescriptor {
            name,
            category: Category::Crypto,
            url,
            wait_for: None,
            base_url: "https://news.test",
            rule: ExtractionRule::Links(LinkRule::new("a").min_len(10)),
        }
    }

    const SITES: [SiteDescriptor; 4] = [
        site("A", "https://news.test/a"),
        site("B", "https://news.test/b"),
        site("C", "https://news.test/c"),
        site("D", "https://news.test/d"),
    ];

    fn collector(browser: &StaticBrowser, target: usize) -> HeadlineCollector {
        HeadlineCollector::new(Arc::new(browser.clone()), SessionConfig::cron())
            .with_target(target)
            .with_timing(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_backup_fills_failed_primary() {
        let browser = StaticBrowser::new()
            .page("https://news.test/a", r#"<a href="/1">Bitcoin ETF sees record inflow</a>"#)
            .page("https://news.test/c", r#"<a href="/3">Ether staking yields compress</a>"#)
            .page("https://news.test/d", r#"<a href="/4">Solana fees hit yearly low</a>"#);

        let headlines = collector(&browser, 2).collect_ordered(&SITES).await;
        let sites: Vec<_> = headlines.iter().map(|h| h.site.as_str()).collect();

        // B fails, C fills the gap, D is never visited
        assert_eq!(sites, ["A", "C"]);
        assert_eq!(browser.opened(), 3);
        assert_eq!(browser.closed(), 3);
    }

    #[tokio::test]
    async fn test_shared_link_kept_once() {
        let same = r#"<a href="/same">Stablecoin supply reaches new high</a><a href="/other">Miners sell as hashprice falls</a>"#;
        let browser = StaticBrowser::new()
            .page("https://news.test/a", same)
            .page("https://news.test/b", same);

        let headlines = collector(&browser, 2).collect_ordered(&SITES[..2]).await;
        let links: Vec<_> = headlines.iter().map(|h| h.link.as_str()).collect();
        assert_eq!(links, ["https://news.test/same", "https://news.test/other"]);
    }

    #[tokio::test]
    async fn test_newest_candidate_wins() {
        let html = r#"
            <div><span data-date="2025-01-01"></span><a href="/old">Older story about markets</a></div>
            <div><span data-date="2025-03-01"></span><a href="/new">Newer story about markets</a></div>"#;
        let browser = StaticBrowser::new().page("https://news.test/a", html);

        let candidates = collector(&browser, 1).scrape_site(&SITES[0]).await.unwrap();
        assert_eq!(candidates[0].link, "https://news.test/new");
    }

    #[tokio::test]
    async fn test_exhausted_pool_returns_partial() {
        let browser = StaticBrowser::new();
        let headlines = collector(&browser, 5).collect(&SITES).await;
        assert!(headlines.is_empty());
        assert_eq!(browser.closed(), 4);
    }
}
