//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - run: drive a character session until interrupted
//! - doctor: validate configuration and probe the collaborating services
//! - parse: run one raw script line through the command grammar

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use sdk::EngineError;

use crate::actor::RemoteActor;
use crate::chat::ChatFeed;
use crate::commands::{parse_line, ScriptCommand};
use crate::config::Config;
use crate::scheduler::Scheduler;
use crate::script::HttpScriptSource;

/// Timeout for a single doctor probe
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Drive a character session until Ctrl-C.
///
/// Assembles the collaborators from configuration, then hands control to
/// the scheduler. The scheduler itself never exits on error; only the
/// interrupt ends the session.
pub async fn handle_run(config: &Config) -> Result<()> {
    if config.actor.character_id.trim().is_empty() {
        return Err(EngineError::Config(
            "actor.character_id is not set; edit ~/.prompter/config.toml".to_string(),
        )
        .into());
    }

    let actor = Arc::new(RemoteActor::new(&config.actor)?);
    let source = Arc::new(HttpScriptSource::new(&config.script_source)?);

    let chat = if config.chat.enabled {
        Some(ChatFeed::new(&config.chat)?)
    } else {
        None
    };

    let mut scheduler = Scheduler::new(actor, source, chat, config.scheduler.clone());

    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, ending session");
        }
    }

    Ok(())
}

/// Probe the collaborating services and report availability.
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()
        .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let script_url = format!(
        "{}/",
        config.script_source.base_url.trim_end_matches('/')
    );
    let chat_url = format!(
        "{}/read_twitch_chat",
        config.chat.base_url.trim_end_matches('/')
    );
    let actor_url = format!("{}/status", config.actor.base_url.trim_end_matches('/'));

    let script_service = probe(&client, &script_url).await;
    let chat_relay = if config.chat.enabled {
        Some(probe(&client, &chat_url).await)
    } else {
        None
    };
    let actor_runtime = probe(&client, &actor_url).await;
    let character_id = config.actor.character_id.trim();

    match format {
        OutputFormat::Text => {
            println!("Prompter diagnostics:");
            println!(
                "  Script service ({}): {}",
                config.script_source.base_url,
                availability(script_service)
            );
            match chat_relay {
                Some(reachable) => println!(
                    "  Chat relay     ({}): {}",
                    config.chat.base_url,
                    availability(reachable)
                ),
                None => println!("  Chat relay     : disabled (scripted-only sessions)"),
            }
            println!(
                "  Actor runtime  ({}): {}",
                config.actor.base_url,
                availability(actor_runtime)
            );
            if character_id.is_empty() {
                println!("  Character id   : (not set; required for `prompter run`)");
            } else {
                println!("  Character id   : {}", character_id);
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "script_service": script_service,
                "chat_relay": chat_relay,
                "actor_runtime": actor_runtime,
                "character_id": if character_id.is_empty() { None } else { Some(character_id) },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Parse one raw script line and print the outcome.
pub fn handle_parse(line: &str, format: OutputFormat) -> Result<()> {
    let command = parse_line(line);

    match format {
        OutputFormat::Text => {
            println!("kind:      {}", kind(&command));
            println!("directive: {}", command.directive());
            match &command {
                ScriptCommand::Unmarked(_) => {
                    println!("note: no command marker; the scheduler would skip this line");
                }
                ScriptCommand::Degraded(_) => {
                    println!("note: matched no grammar rule; forwarded to the actor unchanged");
                }
                _ => {}
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "kind": kind(&command),
                "directive": command.directive(),
                "recognized": command.is_recognized(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Whether anything is answering HTTP at `url`. Any response counts: a 404
/// still proves the service is up; only transport failures do not.
async fn probe(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            false
        }
    }
}

fn availability(reachable: bool) -> &'static str {
    if reachable {
        "reachable"
    } else {
        "unreachable"
    }
}

fn kind(command: &ScriptCommand) -> &'static str {
    match command {
        ScriptCommand::Move { .. } => "move",
        ScriptCommand::Say { .. } => "say",
        ScriptCommand::Verbatim(_) => "verbatim",
        ScriptCommand::Degraded(_) => "degraded",
        ScriptCommand::Unmarked(_) => "unmarked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_counts_any_response_as_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        assert!(probe(&client, &server.uri()).await);
    }

    #[tokio::test]
    async fn test_probe_fails_on_transport_error() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        assert!(!probe(&client, "http://127.0.0.1:9/").await);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(kind(&parse_line("$move to **Podium**")), "move");
        assert_eq!(kind(&parse_line("$say {hi}")), "say");
        assert_eq!(kind(&parse_line("$$dance")), "verbatim");
        assert_eq!(kind(&parse_line("$mystery")), "degraded");
        assert_eq!(kind(&parse_line("narration")), "unmarked");
    }
}
