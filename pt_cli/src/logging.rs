//! Structured logging configuration.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! picks those records up alongside native `tracing` events.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Features:
/// - Configurable log levels via RUST_LOG env var
/// - `log` records from the poker engine bridged into tracing
/// - Output on stderr so stdout stays clean for tool results
///
/// # Example
///
/// ```no_run
/// use pt_cli::logging;
///
/// logging::init();
/// tracing::info!("Host starting");
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log one tool invocation with its outcome
///
/// # Arguments
///
/// * `tool` - Tool name
/// * `game_id` - Game the call targeted, if any
/// * `elapsed` - Time spent in the call
/// * `error` - Client-facing error message when the call failed
///
/// # Example
///
/// ```
/// use pt_cli::logging::log_tool_invocation;
/// use std::time::Duration;
///
/// log_tool_invocation("poker.deal", Some("G1"), Duration::from_millis(3), None);
/// ```
pub fn log_tool_invocation(
    tool: &str,
    game_id: Option<&str>,
    elapsed: Duration,
    error: Option<&str>,
) {
    let duration_ms = elapsed.as_millis() as u64;
    match error {
        None => tracing::info!(
            tool = tool,
            game_id = game_id,
            duration_ms = duration_ms,
            "Tool call completed"
        ),
        Some(error) => tracing::warn!(
            tool = tool,
            game_id = game_id,
            duration_ms = duration_ms,
            error = error,
            "Tool call failed"
        ),
    }
}

/// Log performance metric
///
/// # Arguments
///
/// * `operation` - Operation name
/// * `duration_ms` - Duration in milliseconds
/// * `metadata` - Additional metadata
///
/// # Example
///
/// ```
/// use pt_cli::logging::log_performance;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// // ... do work ...
/// let duration = start.elapsed().as_millis() as u64;
/// log_performance("demo_hand", duration, Some("memory store"));
/// ```
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}
