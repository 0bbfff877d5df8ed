//! Structured logging setup.
//!
//! Tracing-based logging with environment-variable filtering and pretty,
//! compact or JSON output. The library itself only emits `tracing` events;
//! applications opt in by calling [`init_logging`] (or
//! [`try_init_logging`] in tests, where repeated initialization must not
//! panic).

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Most detailed debugging information.
    Trace,
    /// Detailed debugging information.
    Debug,
    /// Important events.
    Info,
    /// Potential issues.
    Warn,
    /// Errors.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Single-line compact output.
    Compact,
    /// JSON output for production environments.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level applied when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Whether to include thread IDs.
    pub show_thread_ids: bool,
    /// Whether to include the emitting module.
    pub show_target: bool,
    /// Whether to log span enter/close events.
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Configuration for production environments.
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_target: false,
            ..Self::default()
        }
    }
}

fn fmt_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("waypost={}", config.level)));

    let span_events = if config.show_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_thread_ids(config.show_thread_ids)
        .with_target(config.show_target)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Pretty => base.pretty().with_filter(env_filter).boxed(),
        LogFormat::Compact => base.compact().with_filter(env_filter).boxed(),
        LogFormat::Json => base.json().with_filter(env_filter).boxed(),
    }
}

/// Initializes the logging system. Panics if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry().with(fmt_layer(config)).init();
}

/// Initializes the logging system, ignoring duplicate initialization.
pub fn try_init_logging(config: &LogConfig) {
    let _ = tracing_subscriber::registry()
        .with(fmt_layer(config))
        .try_init();
}
