//! Chat feed
//!
//! Live chat reaches the engine through a relay endpoint that hands out at
//! most one message per poll. This module wraps that endpoint in a
//! start/stop-able background poller feeding an unbounded channel of
//! pre-formatted `"{nickname}: {text}"` lines.
//!
//! The channel is created once per session and outlives start/stop cycles:
//! messages that arrive while the scheduler is busy with scripted commands
//! wait in order until the next interactive window drains them. The poll
//! task is the only producer; the scheduler is the only consumer.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use sdk::EngineError;

use crate::config::ChatConfig;

/// Timeout for a single poll request
const POLL_REQUEST_TIMEOUT_SECS: u64 = 10;

/// One message from the chat relay.
///
/// An empty response body means "nothing new"; an empty `comment` is
/// treated the same way.
#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(rename = "type", default)]
    kind: String,

    #[serde(default)]
    nickname: String,

    #[serde(default)]
    comment: String,
}

/// Start/stop-able poller for the chat relay.
pub struct ChatFeed {
    config: ChatConfig,
    client: Client,
    tx: mpsc::UnboundedSender<String>,
    poller: Option<JoinHandle<()>>,
}

impl ChatFeed {
    /// Create a feed and the receiving end of its message channel.
    ///
    /// The feed is created stopped; nothing is polled until [`start`]
    /// (ChatFeed::start) is called.
    pub fn new(
        config: &ChatConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<String>), EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();

        Ok((
            Self {
                config: config.clone(),
                client,
                tx,
                poller: None,
            },
            rx,
        ))
    }

    /// Begin polling the relay. Idempotent: a running poller is left alone.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }

        let url = format!(
            "{}/read_twitch_chat",
            self.config.base_url.trim_end_matches('/')
        );
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let client = self.client.clone();
        let tx = self.tx.clone();

        self.poller = Some(tokio::spawn(poll_loop(client, url, interval, tx)));
        info!("Started chat feed");
    }

    /// Stop polling. Idempotent. Messages already in the channel stay there.
    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            info!("Stopped chat feed");
        }
    }

    /// Whether a poll task is currently running.
    pub fn is_active(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Producer handle for the message channel.
    #[cfg(test)]
    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<String> {
        self.tx.clone()
    }
}

impl Drop for ChatFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll the relay until aborted or the consumer goes away.
///
/// Poll errors are logged and do not stop the loop; the relay being down
/// shows up as a quiet interactive session, not a dead one.
async fn poll_loop(
    client: Client,
    url: String,
    interval: Duration,
    tx: mpsc::UnboundedSender<String>,
) {
    loop {
        match fetch_one(&client, &url).await {
            Ok(Some(message)) => {
                let line = format!("{}: {}", message.nickname, message.comment);
                debug!("Chat message ({}): {}", message.kind, line);
                if tx.send(line).is_err() {
                    // Consumer dropped the receiver — session is over
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Chat poll failed: {}", e),
        }

        tokio::time::sleep(interval).await;
    }
}

/// One poll cycle: zero or one message.
async fn fetch_one(client: &Client, url: &str) -> Result<Option<ChatMessage>, EngineError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EngineError::ChatFeed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(EngineError::ChatFeed(format!(
            "chat relay error: {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| EngineError::ChatFeed(e.to_string()))?;

    if body.trim().is_empty() {
        return Ok(None);
    }

    let message: ChatMessage = serde_json::from_str(&body)
        .map_err(|e| EngineError::ChatFeed(format!("failed to parse chat message: {}", e)))?;

    if message.comment.is_empty() {
        debug!("Chat relay returned a message without a comment");
        return Ok(None);
    }

    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ChatConfig {
        ChatConfig {
            enabled: true,
            base_url,
            poll_interval_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_poll_delivers_formatted_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_twitch_chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "comment",
                "nickname": "viewer42",
                "comment": "hello there"
            })))
            .mount(&server)
            .await;

        let (mut feed, mut rx) = ChatFeed::new(&test_config(server.uri())).unwrap();
        feed.start();

        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("poller should deliver a message")
            .expect("channel open");
        assert_eq!(line, "viewer42: hello there");

        feed.stop();
        assert!(!feed.is_active());
    }

    #[tokio::test]
    async fn test_empty_body_means_no_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_twitch_chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let (mut feed, mut rx) = ChatFeed::new(&test_config(server.uri())).unwrap();
        feed.start();

        let outcome = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(outcome.is_err(), "no message should be delivered");
    }

    #[tokio::test]
    async fn test_messages_survive_while_stopped() {
        let server = MockServer::start().await;
        let (feed, mut rx) = ChatFeed::new(&test_config(server.uri())).unwrap();

        // Never started: lines pushed by a producer still wait in order.
        feed.sender().send("a: 1".to_string()).unwrap();
        feed.sender().send("b: 2".to_string()).unwrap();

        assert_eq!(rx.recv().await.unwrap(), "a: 1");
        assert_eq!(rx.recv().await.unwrap(), "b: 2");
        drop(server);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/read_twitch_chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let (mut feed, _rx) = ChatFeed::new(&test_config(server.uri())).unwrap();
        feed.start();
        feed.start();
        assert!(feed.is_active());
        feed.stop();
        feed.stop();
        assert!(!feed.is_active());
    }
}
