//! Browser Sessions
//!
//! A remote browser session is opened for exactly one page visit and is
//! always closed afterwards, whether or not the visit succeeded.
//!
//! ```text
//!   open ──▶ navigate ──▶ wait_for? ──▶ settle ──▶ content
//!     │                                              │
//!     └──────────────── close (always) ◀─────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, ScrapeError};

/// Node used by scheduled runs
pub const CRON_NODE_ID: &str = "stairs-brush-artefact";

/// Where the remote browser runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    Hosted,
    ConsumerDistributed,
}

impl SessionKind {
    pub const ALL: [Self; 2] = [Self::Hosted, Self::ConsumerDistributed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::ConsumerDistributed => "consumer_distributed",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser window size, written `WIDTHxHEIGHT`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self { width: 1920, height: 1080 }
    }
}

impl FromStr for WindowSize {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ScrapeError::Session(format!("invalid window size {s:?}, expected WIDTHxHEIGHT"));
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Serialize for WindowSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Named browser profile kept between sessions
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BrowserProfile {
    pub name: String,
    pub persist: bool,
}

/// Settings for every remote browser session of a run
///
/// Built once by the CLI layer and passed by reference to each visit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(rename = "type")]
    pub kind: SessionKind,

    /// Exit country; `None` means any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    pub window_size: WindowSize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<BrowserProfile>,
}

impl SessionConfig {
    /// Fixed non-interactive configuration for scheduled runs
    pub fn cron() -> Self {
        Self {
            kind: SessionKind::Hosted,
            country: None,
            node_id: Some(CRON_NODE_ID.into()),
            window_size: WindowSize::default(),
            proxy_url: None,
            profile: None,
        }
    }
}

/// One open remote browser tab
#[async_trait]
pub trait BrowserSession: Send {
    /// Provider-assigned session id
    fn id(&self) -> &str;

    /// Load `url`, failing after `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches; `Ok(false)` when it never did
    async fn wait_for(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }

    /// Scroll the page to trigger lazy content
    async fn scroll(&mut self, _pixels: u32) -> Result<()> {
        Ok(())
    }

    /// Rendered document HTML
    async fn content(&mut self) -> Result<String>;

    /// Release the remote session
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Remote browser service (Strategy pattern)
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    /// Open a fresh isolated session
    async fn open(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Parameters of one page visit
#[derive(Clone, Debug)]
pub struct PageVisit<'a> {
    pub url: &'a str,

    /// Selector to wait for after navigation, if any
    pub wait_for: Option<&'a str>,

    pub navigation_timeout: Duration,
    pub wait_timeout: Duration,

    /// Fixed pause before reading the page
    pub settle: Duration,
}

impl<'a> PageVisit<'a> {
    pub const fn new(url: &'a str) -> Self {
        Self {
            url,
            wait_for: None,
            navigation_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(10),
            settle: Duration::from_secs(3),
        }
    }

    pub const fn wait_for(mut self, selector: Option<&'a str>) -> Self {
        self.wait_for = selector;
        self
    }

    pub const fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

async fn drive(session: &mut dyn BrowserSession, visit: &PageVisit<'_>) -> Result<String> {
    session.navigate(visit.url, visit.navigation_timeout).await?;
    if let Some(selector) = visit.wait_for {
        match session.wait_for(selector, visit.wait_timeout).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(selector, "Wait selector never matched"),
            Err(e) => tracing::debug!(selector, error = %e, "Wait selector failed"),
        }
    }
    session.scroll(300).await?;
    if !visit.settle.is_zero() {
        tokio::time::sleep(visit.settle).await;
    }
    session.content().await
}

/// Open a session, load one page and return its HTML
///
/// The session is closed on every path; a close failure is logged and does
/// not mask the visit result.
pub async fn visit_page(provider: &dyn BrowserProvider, config: &SessionConfig, visit: &PageVisit<'_>) -> Result<String> {
    let mut session = provider.open(config).await?;
    tracing::debug!(session = session.id(), url = visit.url, "Session opened");

    let outcome = drive(session.as_mut(), visit).await;

    let id = session.id().to_string();
    if let Err(e) = session.close().await {
        tracing::warn!(session = %id, error = %e, "Failed to close browser session");
    }
    outcome
}

/// In-memory browser serving fixed HTML per URL
///
/// For tests and dry runs. Counts opened and closed sessions so callers can
/// check that every session was released.
#[derive(Clone, Default)]
pub struct StaticBrowser {
    pages: HashMap<String, String>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`; unknown URLs fail navigation
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct StaticSession {
    id: String,
    pages: HashMap<String, String>,
    current: Option<String>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for StaticSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        match self.pages.get(url) {
            Some(html) => {
                self.current = Some(html.clone());
                Ok(())
            }
            None => Err(ScrapeError::Navigation(format!("{url} unreachable"))),
        }
    }

    async fn wait_for(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.current.is_some())
    }

    async fn content(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| ScrapeError::Navigation("no page loaded".into()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserProvider for StaticBrowser {
    async fn open(&self, _config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(StaticSession {
            id: format!("static-{n}"),
            pages: self.pages.clone(),
            current: None,
            closed: Arc::clone(&self.closed),
        }))
    }

    fn name(&self) -> &str {
        "StaticBrowser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_window_size_parsing() {
        let size: WindowSize = "1280x720".parse().unwrap();
        assert_eq!(size, WindowSize { width: 1280, height: 720 });
        assert_eq!(size.to_string(), "1280x720");
        assert!("wide".parse::<WindowSize>().is_err());
    }

    #[test]
    fn test_cron_config_serialization() {
        let value = serde_json::to_value(SessionConfig::cron()).unwrap();
        assert_eq!(
            value,
            json!({"type": "hosted", "nodeId": "stairs-brush-artefact", "windowSize": "1920x1080"})
        );
    }

    #[tokio::test]
    async fn test_session_closed_after_success() {
        let browser = StaticBrowser::new().page("https://a.test/", "<html>ok</html>");
        let visit = PageVisit::new("https://a.test/").settle(Duration::ZERO);

        let html = visit_page(&browser, &SessionConfig::cron(), &visit).await.unwrap();
        assert!(html.contains("ok"));
        assert_eq!((browser.opened(), browser.closed()), (1, 1));
    }

    #[tokio::test]
    async fn test_session_closed_after_failure() {
        let browser = StaticBrowser::new();
        let visit = PageVisit::new("https://down.test/").settle(Duration::ZERO);

        let err = visit_page(&browser, &SessionConfig::default(), &visit).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Navigation(_)));
        assert_eq!((browser.opened(), browser.closed()), (1, 1));
    }
}
