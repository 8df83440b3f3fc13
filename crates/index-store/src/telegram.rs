//! Telegram Delivery
//!
//! Markdown messages through the Bot API `sendMessage` method.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};

/// Outbound message channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one Markdown message
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Backslash-escape the characters legacy Markdown treats as entity markers
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Announcement for a freshly found news item
pub fn news_message(site: &str, title: &str, link: &str) -> String {
    format!(
        "📢 *{}*\n\n{}. [Read more]({link})",
        escape_markdown(site),
        escape_markdown(title)
    )
}

/// Bot credentials
#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,

    /// Bot API base URL
    pub base_url: String,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            base_url: "https://api.telegram.org".into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct BotReply {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API client
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.base_url.trim_end_matches('/'),
            self.config.bot_token
        );
        let body = json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        // The Bot API reports failures in the body, often with a 4xx status
        let reply: BotReply = self.client.post(url).json(&body).send().await?.json().await?;
        if reply.ok {
            Ok(())
        } else {
            let description = reply.description.unwrap_or_else(|| "sendMessage rejected".into());
            tracing::warn!(chat = %self.config.chat_id, %description, "Telegram rejected message");
            Err(StoreError::Telegram(description))
        }
    }
}

/// Notifier that keeps messages in memory
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_news_message_format() {
        assert_eq!(
            news_message("Decrypt", "ETH hits new high", "https://decrypt.co/1"),
            "📢 *Decrypt*\n\nETH hits new high. [Read more](https://decrypt.co/1)"
        );
    }

    #[test]
    fn test_news_message_escapes_entity_markers() {
        let text = news_message("Bit_Wire", "Fed *cuts* rates [live] as `BTC_USD` jumps", "https://a.test/x_y");
        assert_eq!(
            text,
            "📢 *Bit\\_Wire*\n\nFed \\*cuts\\* rates \\[live] as \\`BTC\\_USD\\` jumps. [Read more](https://a.test/x_y)"
        );
    }

    #[tokio::test]
    async fn test_send_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "-100",
                "parse_mode": "Markdown",
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(TelegramConfig::new("123:abc", "-100").with_base_url(server.uri())).unwrap();
        notifier.notify("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"ok": false, "description": "Bad Request: chat not found"})),
            )
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(TelegramConfig::new("t", "c").with_base_url(server.uri())).unwrap();
        let err = notifier.notify("hello").await.unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }
}
