//! Logging setup for the Postboard library and binary
//!
//! Everything goes to stderr so that command output on stdout stays
//! machine-readable. Three formats are available:
//! - `text`: plain lines, no target (default)
//! - `json`: one JSON object per line
//! - `pretty`: multi-line, coloured, with file and line
//!
//! # Examples
//!
//! ```no_run
//! use libpostboard::logging::{LoggingConfig, LogFormat};
//!
//! LoggingConfig::new(LogFormat::Json, "debug".to_string(), false).init();
//!
//! // Or honour POSTBOARD_LOG_FORMAT / POSTBOARD_LOG_LEVEL
//! libpostboard::logging::init_default();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                other
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// `verbose` forces the `debug` level unless `RUST_LOG` says otherwise
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    fn filter(&self) -> EnvFilter {
        let fallback = if self.verbose { "debug" } else { self.level.as_str() };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    /// Install the global subscriber.
    ///
    /// Only the first call in a process takes effect; later calls (tests
    /// initializing logging more than once, say) are ignored.
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr);

        let installed = match self.format {
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => builder.with_target(false).try_init(),
        };

        if installed.is_err() {
            tracing::debug!("Logging already initialized");
        }
    }
}

/// Initialize logging from environment variables only
pub fn init_default() {
    from_settings(&LogSettings::default(), false).init();
}

/// Build a logging configuration from the `[logging]` config section.
///
/// `POSTBOARD_LOG_FORMAT` and `POSTBOARD_LOG_LEVEL` take precedence over the
/// file; an unparseable format falls back to text.
pub fn from_settings(settings: &LogSettings, verbose: bool) -> LoggingConfig {
    let format = std::env::var("POSTBOARD_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .or_else(|| settings.format.parse().ok())
        .unwrap_or(LogFormat::Text);

    let level = std::env::var("POSTBOARD_LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());

    LoggingConfig::new(format, level, verbose)
}
