//! CLI interface for Prompter
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for controlling a character
//! session.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prompter stage-character engine
///
/// Drives an autonomous character through scripted command lists fetched
/// from a script service, and opens timed interactive windows on live chat
/// when the character reaches its trigger location.
#[derive(Parser, Debug)]
#[command(name = "prompter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a character session until interrupted
    Run,

    /// Check configuration and probe the collaborating services
    Doctor,

    /// Parse a raw script line and print the canonical directive
    Parse {
        /// The raw script line
        line: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["prompter", "run"]);
        assert!(matches!(cli.command, Command::Run));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["prompter", "--json", "--log", "debug", "doctor"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert!(matches!(cli.command, Command::Doctor));
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::parse_from(["prompter", "parse", "$say {hi}"]);
        if let Command::Parse { line } = cli.command {
            assert_eq!(line, "$say {hi}");
        } else {
            panic!("Expected Parse command");
        }
    }
}
