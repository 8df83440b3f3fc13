//! Browser.cash Provider
//!
//! Remote browsers rented per visit: a REST call creates a session and
//! returns its DevTools websocket URL, another stops it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::cdp::CdpConnection;
use crate::error::{Result, ScrapeError};
use crate::session::{BrowserProvider, BrowserSession, SessionConfig};

/// Browser.cash client configuration
#[derive(Clone, Debug)]
pub struct BrowserCashConfig {
    /// Bearer token for the session API
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BrowserCashConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.browser.cash".into(),
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// A session as returned by the create call
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSession {
    pub session_id: String,
    pub cdp_url: String,
}

/// Browser.cash session API client
#[derive(Clone)]
pub struct BrowserCash {
    client: reqwest::Client,
    config: BrowserCashConfig,
}

impl BrowserCash {
    pub fn new(config: BrowserCashConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/browser/session", self.config.base_url.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ScrapeError::Session(format!("{action} failed ({status}): {body}")))
    }

    /// Create a session with the run's settings
    pub async fn create_session(&self, config: &SessionConfig) -> Result<RemoteSession> {
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.config.api_key)
            .json(config)
            .send()
            .await?;
        Ok(Self::check(response, "create session").await?.json().await?)
    }

    /// Stop a session; the provider releases the browser
    pub async fn stop_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.sessions_url())
            .bearer_auth(&self.config.api_key)
            .query(&[("sessionId", session_id)])
            .send()
            .await?;
        Self::check(response, "stop session").await?;
        Ok(())
    }

    async fn stop_quietly(&self, session_id: &str) {
        if let Err(e) = self.stop_session(session_id).await {
            tracing::warn!(session = session_id, error = %e, "Failed to stop browser session");
        }
    }
}

/// One rented browser driven over DevTools
pub struct BrowserCashSession {
    id: String,
    cdp: CdpConnection,
    api: BrowserCash,
}

#[async_trait]
impl BrowserSession for BrowserCashSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.cdp.navigate(url, timeout).await
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        self.cdp.wait_for(selector, timeout).await
    }

    async fn scroll(&mut self, pixels: u32) -> Result<()> {
        self.cdp.scroll(pixels).await
    }

    async fn content(&mut self) -> Result<String> {
        self.cdp.content().await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let Self { id, cdp, api } = *self;
        if let Err(e) = cdp.close().await {
            tracing::debug!(session = %id, error = %e, "DevTools socket close failed");
        }
        api.stop_session(&id).await
    }
}

#[async_trait]
impl BrowserProvider for BrowserCash {
    async fn open(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
        let remote = self.create_session(config).await?;

        let cdp = match CdpConnection::connect(&remote.cdp_url).await {
            Ok(mut cdp) => match cdp.attach_page().await {
                Ok(()) => cdp,
                Err(e) => {
                    let _ = cdp.close().await;
                    self.stop_quietly(&remote.session_id).await;
                    return Err(e);
                }
            },
            Err(e) => {
                self.stop_quietly(&remote.session_id).await;
                return Err(e);
            }
        };

        Ok(Box::new(BrowserCashSession {
            id: remote.session_id,
            cdp,
            api: self.clone(),
        }))
    }

    fn name(&self) -> &str {
        "Browser.cash"
    }
}
