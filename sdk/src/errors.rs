//! Error types and handling
//!
//! This module provides the error types used throughout the Prompter engine.
//! All errors implement the `EngineErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! The session loop itself never dies on any of these: fetch and poll
//! failures are logged and retried on the normal cadence. The taxonomy
//! exists so the CLI can explain a failed startup or probe to the operator.

use thiserror::Error;

/// Trait for engine error extensions
///
/// Provides additional context for errors: a hint safe to show an operator,
/// and whether the condition is expected to clear on its own.
pub trait EngineErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors clear on a later attempt (the next fetch, the next
    /// poll cycle). Non-recoverable errors require the operator to fix
    /// configuration or a collaborator before the session is useful.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: invalid or missing configuration
/// - **ScriptFetch**: the script service failed to deliver a command list
/// - **ChatFeed**: the chat relay could not be polled
/// - **Actor**: the character runtime could not be reached
/// - **MissingCollaborator**: a required external component is absent at
///   session start
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Script service errors
    #[error("Script fetch failed: {0}")]
    ScriptFetch(String),

    #[error("Script service unreachable: {0}")]
    ScriptServiceUnavailable(String),

    // Chat relay errors
    #[error("Chat feed error: {0}")]
    ChatFeed(String),

    // Actor transport errors
    #[error("Actor error: {0}")]
    Actor(String),

    // Session assembly errors
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::ScriptFetch(_) => {
                "Script service returned an error. The next attempt runs after the cooldown"
            }
            Self::ScriptServiceUnavailable(_) => {
                "Cannot reach the script service. Check the base_url and that it is running"
            }
            Self::ChatFeed(_) => "Chat relay unavailable. Interactive sessions will sit idle",
            Self::Actor(_) => "Cannot reach the character runtime. Check the actor base_url",
            Self::MissingCollaborator(_) => {
                "A collaborator is not configured. The session runs with reduced behavior"
            }
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Operator has to fix these before a session makes sense
            Self::Config(_) | Self::MissingCollaborator(_) => false,

            // All other errors clear on a later attempt
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_recoverable() {
        let error = EngineError::ScriptFetch("503".to_string());
        assert!(error.is_recoverable());

        let error = EngineError::ScriptServiceUnavailable("connect refused".to_string());
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_config_errors_are_not_recoverable() {
        let error = EngineError::Config("bad log level".to_string());
        assert!(!error.is_recoverable());

        let error = EngineError::MissingCollaborator("chat feed".to_string());
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_hints_do_not_leak_detail() {
        let error = EngineError::Actor("http://10.0.0.3:9010/submit: timed out".to_string());
        assert!(!error.user_hint().contains("10.0.0.3"));
    }
}
