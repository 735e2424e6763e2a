//! Script source
//!
//! This module implements fetching of scripted command lists from the script
//! service. The service holds the character's memory and planning state and,
//! on request, produces an ordered list of raw command lines for one
//! character.
//!
//! The scheduler talks to the [`ScriptSource`] trait; [`HttpScriptSource`]
//! is the production implementation. Fetch failures are never fatal; the
//! scheduler logs them and tries again after its cooldown.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use sdk::EngineError;

use crate::config::ScriptSourceConfig;

/// Fetch-on-demand provider of raw command lines for a character.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    /// Request a fresh script for the given character identity.
    ///
    /// Returns the raw lines in execution order. The lines are unparsed;
    /// grammar handling is the caller's concern.
    async fn fetch_script(&self, character_id: &str) -> Result<Vec<String>, EngineError>;
}

/// Script service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpScriptSource {
    /// Base URL of the script service
    base_url: String,

    /// HTTP client for API requests
    client: Client,
}

/// Script generation request body.
///
/// The service predates this engine and keys the request on `npc1_id`; the
/// rename keeps us wire-compatible.
#[derive(Debug, Serialize)]
struct GenerateScriptRequest<'a> {
    #[serde(rename = "npc1_id")]
    character_id: &'a str,
}

/// Script generation response body.
#[derive(Debug, Deserialize)]
struct ScriptResponse {
    script: Vec<String>,
}

impl HttpScriptSource {
    /// Create a new script service client from configuration.
    pub fn new(config: &ScriptSourceConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ScriptSource for HttpScriptSource {
    async fn fetch_script(&self, character_id: &str) -> Result<Vec<String>, EngineError> {
        let url = format!("{}/generate_script", self.base_url);
        let request = GenerateScriptRequest { character_id };

        tracing::debug!("Requesting script for {} from {}", character_id, url);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::ScriptServiceUnavailable(format!(
                        "timed out after {:.0?}",
                        start.elapsed()
                    ))
                } else if e.is_connect() {
                    EngineError::ScriptServiceUnavailable(format!(
                        "cannot connect to {}. Is the script service running?",
                        self.base_url
                    ))
                } else {
                    EngineError::ScriptFetch(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::ScriptFetch(format!(
                "script service error ({}): {}",
                status, error_text
            )));
        }

        let script: ScriptResponse = response.json().await.map_err(|e| {
            EngineError::ScriptFetch(format!("failed to parse script response: {}", e))
        })?;

        tracing::info!(
            "Received {} script line(s) in {:.1}s",
            script.script.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(script.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ScriptSourceConfig {
        ScriptSourceConfig {
            base_url,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_fetch_script_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_script"))
            .and(body_json(serde_json::json!({ "npc1_id": "char-7" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "script": ["$\"move to **Podium**\"", "$say {hello}"]
            })))
            .mount(&server)
            .await;

        let source = HttpScriptSource::new(&test_config(server.uri())).unwrap();
        let lines = source.fetch_script("char-7").await.unwrap();
        assert_eq!(
            lines,
            vec![
                "$\"move to **Podium**\"".to_string(),
                "$say {hello}".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_script_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_script"))
            .respond_with(ResponseTemplate::new(500).set_body_string("planner exploded"))
            .mount(&server)
            .await;

        let source = HttpScriptSource::new(&test_config(server.uri())).unwrap();
        let error = source.fetch_script("char-7").await.unwrap_err();
        assert!(matches!(error, EngineError::ScriptFetch(_)));
        assert!(error.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_script_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_script"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let source = HttpScriptSource::new(&test_config(server.uri())).unwrap();
        let error = source.fetch_script("char-7").await.unwrap_err();
        assert!(matches!(error, EngineError::ScriptFetch(_)));
    }
}
