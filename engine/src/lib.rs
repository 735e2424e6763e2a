//! Prompter Engine Library
//!
//! This library provides the core functionality of the Prompter engine: the
//! command scheduler that drives an autonomous character through scripted
//! command lists, and the collaborators it sequences: a script service, a
//! live chat relay, and the character runtime itself.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Command grammar: raw script lines to canonical directives
pub mod commands;

/// Script source: fetches command lists from the script service
pub mod script;

/// Chat feed: start/stop-able poller for live chat messages
pub mod chat;

/// Remote actor: HTTP adapter for out-of-process character runtimes
pub mod actor;

/// Command scheduler: the session state machine
pub mod scheduler;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

/// Telemetry and Observability
pub mod telemetry;
