//! Remote actor
//!
//! HTTP adapter implementing [`sdk::Actor`] for character runtimes that live
//! in another process (a game client, a rendering host). The runtime exposes
//! a status endpoint with the two busy predicates and a submit endpoint that
//! accepts directive text.
//!
//! The adapter never surfaces transport failures to the scheduler; the
//! actor contract has no failure channel. A runtime that cannot be reached
//! reports itself as idle and swallows submissions with a logged warning:
//! the session stalls audibly in the logs instead of deadlocking.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use sdk::{Actor, EngineError};

use crate::config::ActorConfig;

/// Timeout for a single actor request
const ACTOR_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Busy-state report from the character runtime.
#[derive(Debug, Default, Deserialize)]
struct ActorStatus {
    #[serde(default)]
    speaking: bool,

    #[serde(default)]
    performing_action: bool,
}

/// Directive submission body.
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    text: &'a str,
}

/// Character runtime reached over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteActor {
    base_url: String,
    character_id: String,
    client: Client,
}

impl RemoteActor {
    /// Create an adapter from configuration.
    pub fn new(config: &ActorConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ACTOR_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            character_id: config.character_id.clone(),
            client,
        })
    }

    /// One status probe. Errors degrade to "idle" at the call sites.
    async fn status(&self) -> Result<ActorStatus, EngineError> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::Actor(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Actor(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Actor(format!("failed to parse status: {}", e)))
    }
}

#[async_trait]
impl Actor for RemoteActor {
    fn identity(&self) -> &str {
        &self.character_id
    }

    async fn is_speaking(&self) -> bool {
        match self.status().await {
            Ok(status) => status.speaking,
            Err(e) => {
                warn!("Actor status probe failed, assuming idle: {}", e);
                false
            }
        }
    }

    async fn is_performing_action(&self) -> bool {
        match self.status().await {
            Ok(status) => status.performing_action,
            Err(e) => {
                warn!("Actor status probe failed, assuming idle: {}", e);
                false
            }
        }
    }

    async fn submit(&self, directive: &str) {
        let url = format!("{}/submit", self.base_url);
        debug!("Submitting directive: {}", directive);

        let outcome = self
            .client
            .post(&url)
            .json(&SubmitRequest { text: directive })
            .send()
            .await;

        match outcome {
            Ok(response) if !response.status().is_success() => {
                warn!("Actor rejected directive ({}): {}", response.status(), directive);
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to submit directive to actor: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ActorConfig {
        ActorConfig {
            base_url,
            character_id: "char-7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_status_predicates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "speaking": true,
                "performing_action": false
            })))
            .mount(&server)
            .await;

        let actor = RemoteActor::new(&test_config(server.uri())).unwrap();
        assert!(actor.is_speaking().await);
        assert!(!actor.is_performing_action().await);
        assert_eq!(actor.identity(), "char-7");
    }

    #[tokio::test]
    async fn test_unreachable_runtime_reads_as_idle() {
        // Port 9 is discard; nothing listens there in the test environment.
        let actor = RemoteActor::new(&test_config("http://127.0.0.1:9".to_string())).unwrap();
        assert!(!actor.is_speaking().await);
        assert!(!actor.is_performing_action().await);
    }

    #[tokio::test]
    async fn test_submit_posts_directive_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_json(serde_json::json!({ "text": "$move to Podium" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let actor = RemoteActor::new(&test_config(server.uri())).unwrap();
        actor.submit("$move to Podium").await;
    }
}
