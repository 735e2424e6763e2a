//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for the whole process. The session loop is
//! long-running and deliberately never dies on collaborator failures, so
//! the log stream is the primary way an operator notices a stalled actor,
//! an unreachable script service, or a quiet chat relay.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `log_level` comes from the CLI flag or the config file; a `RUST_LOG`
/// environment variable overrides both. Debug builds get pretty-printed
/// terminal output, release builds JSON with span context.
pub fn init_telemetry(log_level: &str) {
    let default_filter = format!("{},prompter_engine={}", log_level, log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    #[cfg(debug_assertions)]
    registry
        .with(fmt::layer().pretty().with_target(false))
        .try_init()
        .ok();

    #[cfg(not(debug_assertions))]
    registry
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .ok();
}
