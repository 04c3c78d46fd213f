//! Logging setup
//!
//! Centralized `tracing` initialization so every deployment shape gets a
//! sensible subscriber: none for embedding in a host that configures its
//! own, compact stderr output for normal service operation, verbose
//! output with source locations for chasing protocol issues.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different deployment shapes
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No subscriber; the host application configures its own
    Silent,
    /// Compact stderr output for normal operation
    Service,
    /// Verbose output with source locations for protocol debugging
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initializes logging with the specified mode
///
/// Call early, before opening the bridge, so startup (including a fatal
/// failure to open the serial device) is captured.
///
/// # Environment Variables
///
/// - `AMP_LOG_LEVEL`: override the level filter (error, warn, info,
///   debug, trace), taking precedence over `RUST_LOG`
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Service => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(fmt::layer().pretty().with_file(true).with_line_number(true))
                .with(env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initializes logging from the `AMP_LOG_MODE` environment variable
///
/// Accepts "service" or "debug"; anything else (including unset) is
/// Silent, so embedding hosts are never surprised by output.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("AMP_LOG_MODE").as_deref() {
        Ok("service") => LoggingMode::Service,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("AMP_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
