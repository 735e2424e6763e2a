//! Configuration management
//!
//! This module handles loading, validation, and management of the Prompter
//! configuration. Configuration is stored in TOML format at
//! ~/.prompter/config.toml and is created with defaults on first run.
//!
//! # Configuration Sections
//!
//! - **core**: log level
//! - **script_source**: script service endpoint and request timeout
//! - **chat**: chat relay endpoint, poll cadence, enablement
//! - **actor**: character runtime endpoint and character identity
//! - **scheduler**: cooldowns, delays, and the interactive trigger location
//!
//! Default pacing: a 15 s fetch cooldown, 5 s between scripted commands,
//! 1 s between chat replies, and a 5 minute interactive window at the
//! "Twitch Podium" location.

use sdk::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Script service settings
    #[serde(default)]
    pub script_source: ScriptSourceConfig,

    /// Chat relay settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Character runtime settings
    #[serde(default)]
    pub actor: ActorConfig,

    /// Scheduler pacing settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Script service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSourceConfig {
    /// Base URL of the script service
    #[serde(default = "default_service_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Chat relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Enable the chat feed. When disabled the session runs scripted-only
    /// and the interactive trigger never fires.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the chat relay
    #[serde(default = "default_service_base_url")]
    pub base_url: String,

    /// Seconds between poll cycles
    #[serde(default = "default_chat_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Character runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Base URL of the character runtime
    #[serde(default = "default_actor_base_url")]
    pub base_url: String,

    /// Identity of the driven character, sent with script requests.
    /// Must be set before `prompter run` is useful.
    #[serde(default)]
    pub character_id: String,
}

/// Scheduler pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minimum seconds between script fetch attempts
    #[serde(default = "default_fetch_cooldown")]
    pub fetch_cooldown_secs: u64,

    /// Seconds between scripted commands
    #[serde(default = "default_command_delay")]
    pub command_delay_secs: u64,

    /// Seconds between chat replies during an interactive window
    #[serde(default = "default_chat_delay")]
    pub chat_delay_secs: u64,

    /// Milliseconds between actor busy-state probes
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,

    /// Movement target that opens an interactive window (exact match)
    #[serde(default = "default_interactive_location")]
    pub interactive_location: String,

    /// Seconds an interactive window stays open
    #[serde(default = "default_interactive_window")]
    pub interactive_window_secs: u64,
}

impl SchedulerConfig {
    pub fn fetch_cooldown(&self) -> Duration {
        Duration::from_secs(self.fetch_cooldown_secs)
    }

    pub fn command_delay(&self) -> Duration {
        Duration::from_secs(self.command_delay_secs)
    }

    pub fn chat_delay(&self) -> Duration {
        Duration::from_secs(self.chat_delay_secs)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn interactive_window(&self) -> Duration {
        Duration::from_secs(self.interactive_window_secs)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_service_base_url() -> String {
    "http://localhost:10000".to_string()
}

fn default_actor_base_url() -> String {
    "http://localhost:9010".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_chat_poll_interval() -> u64 {
    1
}

fn default_fetch_cooldown() -> u64 {
    15
}

fn default_command_delay() -> u64 {
    5
}

fn default_chat_delay() -> u64 {
    1
}

fn default_idle_poll_ms() -> u64 {
    200
}

fn default_interactive_location() -> String {
    "Twitch Podium".to_string()
}

fn default_interactive_window() -> u64 {
    300
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ScriptSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_service_base_url(),
            poll_interval_secs: default_chat_poll_interval(),
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            base_url: default_actor_base_url(),
            character_id: String::new(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fetch_cooldown_secs: default_fetch_cooldown(),
            command_delay_secs: default_command_delay(),
            chat_delay_secs: default_chat_delay(),
            idle_poll_ms: default_idle_poll_ms(),
            interactive_location: default_interactive_location(),
            interactive_window_secs: default_interactive_window(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            script_source: ScriptSourceConfig::default(),
            chat: ChatConfig::default(),
            actor: ActorConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.prompter/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading and returns
    /// descriptive errors if validation fails.
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();
        config.validate()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.prompter/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".prompter").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// The character id is deliberately not required here; a freshly
    /// created default config must still load so the operator can run
    /// `prompter doctor` and edit the file. `prompter run` checks it.
    fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.chat.poll_interval_secs == 0 {
            return Err(EngineError::Config(
                "chat.poll_interval_secs must be greater than zero".to_string(),
            ));
        }

        if self.scheduler.idle_poll_ms == 0 {
            return Err(EngineError::Config(
                "scheduler.idle_poll_ms must be greater than zero".to_string(),
            ));
        }

        if self.scheduler.interactive_window_secs == 0 {
            return Err(EngineError::Config(
                "scheduler.interactive_window_secs must be greater than zero".to_string(),
            ));
        }

        if self.scheduler.interactive_location.trim().is_empty() {
            return Err(EngineError::Config(
                "scheduler.interactive_location must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.scheduler.fetch_cooldown_secs, 15);
        assert_eq!(config.scheduler.command_delay_secs, 5);
        assert_eq!(config.scheduler.chat_delay_secs, 1);
        assert_eq!(config.scheduler.interactive_location, "Twitch Podium");
        assert_eq!(config.scheduler.interactive_window_secs, 300);
        assert!(config.chat.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(
            config.scheduler.interactive_location,
            deserialized.scheduler.interactive_location
        );
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[core]
log_level = "debug"

[actor]
character_id = "char-7"

[scheduler]
fetch_cooldown_secs = 2
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.core.log_level, "debug");
        assert_eq!(config.actor.character_id, "char-7");
        assert_eq!(config.scheduler.fetch_cooldown_secs, 2);
        // Unspecified sections fall back to defaults
        assert_eq!(config.scheduler.command_delay_secs, 5);
        assert_eq!(config.chat.poll_interval_secs, 1);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[core]\nlog_level = \"loud\"\n").unwrap();

        let error = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(error, EngineError::Config(_)));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[chat]\npoll_interval_secs = 0\n").unwrap();

        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn test_empty_interactive_location_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scheduler]\ninteractive_location = \"  \"\n").unwrap();

        assert!(Config::load_from_path(&path).is_err());
    }
}
