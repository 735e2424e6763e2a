// Prompter stage-character engine
// Main entry point for the prompter binary

use clap::Parser;
use prompter_engine::cli::{Cli, Command};
use prompter_engine::config::Config;
use prompter_engine::handlers::{handle_doctor, handle_parse, handle_run, OutputFormat};
use prompter_engine::telemetry::init_telemetry;
use sdk::{EngineError, EngineErrorExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)
    } else {
        Config::load_or_create()
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Hint: {}", e.user_hint());
            std::process::exit(1);
        }
    };

    // CLI flag beats the config-driven log level; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry(log_level);

    tracing::info!("Prompter Engine v{}", env!("CARGO_PKG_VERSION"));

    // Handle commands
    let result = match cli.command {
        Command::Run => {
            tracing::info!("Starting character session...");
            handle_run(&config).await
        }

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }

        Command::Parse { line } => handle_parse(&line, format),
    };

    // Attach an operator hint before handing the error to anyhow
    if let Err(e) = &result {
        if let Some(engine_error) = e.downcast_ref::<EngineError>() {
            eprintln!("Hint: {}", engine_error.user_hint());
            if !engine_error.is_recoverable() {
                eprintln!("This needs fixing before a session can run.");
            }
        }
    }

    result
}
