//! DevTools Protocol Connection
//!
//! Minimal Chrome DevTools client over a websocket: one page target,
//! sequential request/response calls matched by id. Events arriving between
//! a request and its reply are skipped.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::{Result, ScrapeError};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Deserialize)]
struct Reply {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<ReplyError>,
}

#[derive(Deserialize)]
struct ReplyError {
    message: String,
}

/// Websocket connection driving one page
pub struct CdpConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
    session_id: Option<String>,
}

impl CdpConnection {
    /// Connect to a browser-level DevTools endpoint
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = connect_async(url).await?;
        Ok(Self {
            socket,
            next_id: 0,
            session_id: None,
        })
    }

    /// Send one command and wait for its reply
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;

        let mut request = json!({ "id": id, "method": method, "params": params });
        if let Some(session_id) = &self.session_id {
            request["sessionId"] = json!(session_id);
        }
        self.socket.send(Message::Text(request.to_string())).await?;

        while let Some(frame) = self.socket.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            let reply: Reply = serde_json::from_str(&text)?;
            if reply.id != Some(id) {
                continue;
            }
            if let Some(error) = reply.error {
                return Err(ScrapeError::Protocol(format!("{method}: {}", error.message)));
            }
            return Ok(reply.result.unwrap_or(Value::Null));
        }

        Err(ScrapeError::Protocol(format!("{method}: connection closed")))
    }

    /// Open a blank tab and route further calls to it
    pub async fn attach_page(&mut self) -> Result<()> {
        let target = self.call("Target.createTarget", json!({ "url": "about:blank" })).await?;
        let target_id = target["targetId"]
            .as_str()
            .ok_or_else(|| ScrapeError::Protocol("createTarget returned no targetId".into()))?
            .to_string();

        let attached = self
            .call("Target.attachToTarget", json!({ "targetId": target_id, "flatten": true }))
            .await?;
        let session_id = attached["sessionId"]
            .as_str()
            .ok_or_else(|| ScrapeError::Protocol("attachToTarget returned no sessionId".into()))?;
        self.session_id = Some(session_id.to_string());
        Ok(())
    }

    /// Evaluate a JavaScript expression and return its JSON value
    pub async fn evaluate(&mut self, expression: &str) -> Result<Value> {
        let reply = self
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true, "awaitPromise": true }),
            )
            .await?;
        if let Some(details) = reply.get("exceptionDetails") {
            let text = details["text"].as_str().unwrap_or("exception");
            return Err(ScrapeError::Protocol(format!("evaluate: {text}")));
        }
        Ok(reply["result"]["value"].clone())
    }

    async fn load(&mut self, url: &str) -> Result<()> {
        let reply = self.call("Page.navigate", json!({ "url": url })).await?;
        if let Some(error) = reply["errorText"].as_str() {
            return Err(ScrapeError::Navigation(format!("{url}: {error}")));
        }
        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("interactive" | "complete")) {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn poll_until_true(&mut self, expression: &str) -> Result<()> {
        loop {
            if self.evaluate(expression).await?.as_bool() == Some(true) {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Navigate and wait until the DOM is parsed
    pub async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.load(url))
            .await
            .map_err(|_| ScrapeError::Timeout(format!("navigating to {url}")))?
    }

    /// Poll until `selector` matches; `Ok(false)` after `timeout`
    pub async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let expression = format!("document.querySelector({}) !== null", serde_json::to_string(selector)?);
        match tokio::time::timeout(timeout, self.poll_until_true(&expression)).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    pub async fn scroll(&mut self, pixels: u32) -> Result<()> {
        self.evaluate(&format!("window.scrollBy(0, {pixels})")).await?;
        Ok(())
    }

    /// Serialized document
    pub async fn content(&mut self) -> Result<String> {
        self.evaluate("document.documentElement.outerHTML")
            .await?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ScrapeError::Protocol("page returned no HTML".into()))
    }

    pub async fn close(mut self) -> Result<()> {
        match self.socket.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-process DevTools endpoint answering with canned values

    use super::*;
    use tokio::net::TcpListener;

    /// Serve one connection; returns its `ws://` URL
    pub async fn spawn(html: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request: Value = serde_json::from_str(&text).unwrap();
                let expression = request["params"]["expression"].as_str().unwrap_or_default();
                let result = match request["method"].as_str().unwrap_or_default() {
                    "Target.createTarget" => json!({ "targetId": "T1" }),
                    "Target.attachToTarget" => json!({ "sessionId": "S1" }),
                    "Page.navigate" => json!({ "frameId": "F1" }),
                    "Runtime.evaluate" if expression.contains("readyState") => {
                        json!({ "result": { "type": "string", "value": "complete" } })
                    }
                    "Runtime.evaluate" if expression.contains("outerHTML") => {
                        json!({ "result": { "type": "string", "value": html } })
                    }
                    "Runtime.evaluate" if expression.contains("querySelector") => {
                        json!({ "result": { "type": "boolean", "value": true } })
                    }
                    _ => json!({ "result": { "type": "undefined" } }),
                };

                let event = json!({ "method": "Page.frameStartedLoading", "params": {} });
                ws.send(Message::Text(event.to_string())).await.unwrap();
                let reply = json!({ "id": request["id"], "result": result });
                ws.send(Message::Text(reply.to_string())).await.unwrap();
            }
        });

        format!("ws://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_page_flow() {
        let url = fake::spawn("<html><body>hello</body></html>").await;
        let mut cdp = CdpConnection::connect(&url).await.unwrap();

        cdp.attach_page().await.unwrap();
        assert_eq!(cdp.session_id.as_deref(), Some("S1"));

        cdp.navigate("https://news.test/", Duration::from_secs(5)).await.unwrap();
        assert!(cdp.wait_for("article a", Duration::from_secs(1)).await.unwrap());
        cdp.scroll(300).await.unwrap();
        assert_eq!(cdp.content().await.unwrap(), "<html><body>hello</body></html>");
        cdp.close().await.unwrap();
    }
}
