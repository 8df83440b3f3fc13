//! Storage Traits
//!
//! - [`IndexStore`]: append-only history of scored runs
//! - [`NewsLedger`]: links already published by the news monitor
//!
//! Both have a Supabase implementation and an in-memory one for tests.

use async_trait::async_trait;
use index_core::PersistedRow;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::supabase::SupabaseClient;

/// Table holding the news monitor's ledger
pub const NEWS_TABLE: &str = "news";

/// Append-only index history
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Insert one row into `row.table`
    async fn append(&self, row: &PersistedRow) -> Result<()>;
}

/// One published news item
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewsEntry {
    pub site_name: String,
    pub category: String,
    pub title: String,
    pub link: String,
}

/// Record of links already sent
#[async_trait]
pub trait NewsLedger: Send + Sync {
    /// Whether `link` was recorded by any earlier run
    async fn contains(&self, link: &str) -> Result<bool>;

    /// Record an entry; `Ok(false)` when its link was already present
    async fn record(&self, entry: &NewsEntry) -> Result<bool>;

    /// Number of recorded entries
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
impl IndexStore for SupabaseClient {
    async fn append(&self, row: &PersistedRow) -> Result<()> {
        self.insert(&row.table, &row.to_json()).await
    }
}

#[async_trait]
impl NewsLedger for SupabaseClient {
    async fn contains(&self, link: &str) -> Result<bool> {
        self.exists(NEWS_TABLE, "link", link).await
    }

    async fn record(&self, entry: &NewsEntry) -> Result<bool> {
        match self.insert(NEWS_TABLE, &serde_json::to_value(entry)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_duplicate() => {
                tracing::debug!(link = %entry.link, "Link already stored");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.count_rows(NEWS_TABLE).await
    }
}

/// In-memory index history
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<(String, Value)>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every insert fails
    pub fn unavailable() -> Self {
        Self {
            rows: RwLock::default(),
            unavailable: true,
        }
    }

    /// `(table, row)` pairs in insertion order
    pub async fn rows(&self) -> Vec<(String, Value)> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl IndexStore for MemoryStore {
    async fn append(&self, row: &PersistedRow) -> Result<()> {
        if self.unavailable {
            return Err(StoreError::Http {
                status: 503,
                message: "store unavailable".into(),
            });
        }
        self.rows.write().await.push((row.table.clone(), row.to_json()));
        Ok(())
    }
}

/// In-memory news ledger
#[derive(Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<NewsEntry>>,
    seeded: Vec<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `links` as sent by an earlier run
    pub fn with_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: RwLock::default(),
            seeded: links.into_iter().map(Into::into).collect(),
        }
    }

    pub async fn entries(&self) -> Vec<NewsEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl NewsLedger for MemoryLedger {
    async fn contains(&self, link: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(self.seeded.iter().any(|l| l == link) || entries.iter().any(|e| e.link == link))
    }

    async fn record(&self, entry: &NewsEntry) -> Result<bool> {
        if self.contains(&entry.link).await? {
            return Ok(false);
        }
        self.entries.write().await.push(entry.clone());
        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        let total = self.seeded.len() + self.entries.read().await.len();
        Ok(total as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_core::{Headline, ScoreResult};
    use serde_json::json;
    use std::collections::BTreeMap;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::supabase::SupabaseConfig;

    fn entry(link: &str) -> NewsEntry {
        NewsEntry {
            site_name: "Decrypt".into(),
            category: "crypto".into(),
            title: "Solana validators approve fee overhaul".into(),
            link: link.into(),
        }
    }

    fn row() -> PersistedRow {
        let result = ScoreResult {
            score: 62.0,
            label: "Greed".into(),
            reason: "x".into(),
            factors: BTreeMap::new(),
            token_scores: None,
        };
        PersistedRow::new("fear_greed_index", Uuid::new_v4(), result, vec![Headline::new("A", "T", "https://a/1")])
    }

    #[tokio::test]
    async fn test_memory_store_appends() {
        let store = MemoryStore::new();
        store.append(&row()).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "fear_greed_index");
        assert_eq!(rows[0].1["label"], "Greed");

        assert!(MemoryStore::unavailable().append(&row()).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_ledger_dedup() {
        let ledger = MemoryLedger::with_links(["https://old/1"]);
        assert!(ledger.contains("https://old/1").await.unwrap());
        assert!(!ledger.record(&entry("https://old/1")).await.unwrap());
        assert!(ledger.record(&entry("https://new/1")).await.unwrap());
        assert!(!ledger.record(&entry("https://new/1")).await.unwrap());
        assert_eq!(ledger.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_supabase_record_ignores_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/news"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"code": "23505", "message": "dup"})))
            .mount(&server)
            .await;

        let supabase = SupabaseClient::new(SupabaseConfig::new(server.uri(), "anon")).unwrap();
        assert!(!supabase.record(&entry("https://decrypt.co/1")).await.unwrap());
    }
}
