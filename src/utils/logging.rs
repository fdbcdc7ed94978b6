//! Logging Module
//!
//! Compact `tracing` output for the server. Request spans come from
//! tower-http's `TraceLayer`; each analysis runs in its own `analyze` span.

use std::io::IsTerminal;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use super::error::{PlantVillageError, Result};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Print the module path of each event
    pub show_target: bool,
    /// Print the worker thread id (useful to follow blocking inference)
    pub show_thread_ids: bool,
    /// Colored output, off when stdout is not a terminal
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_target: false,
            show_thread_ids: false,
            ansi: std::io::stdout().is_terminal(),
        }
    }
}

impl LogConfig {
    /// Debug level with targets and thread ids
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            show_target: true,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// Minimum level accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
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

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global subscriber
///
/// Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(config.level))
        .with_ansi(config.ansi)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| PlantVillageError::Config(format!("logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" INFO ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_round_trips_through_display() {
        for level in [LogLevel::Trace, LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn test_verbose_config() {
        assert_eq!(LogConfig::default().level, LogLevel::Info);

        let verbose = LogConfig::verbose().with_level(LogLevel::Trace);
        assert_eq!(verbose.level, LogLevel::Trace);
        assert!(verbose.show_target);
        assert!(verbose.show_thread_ids);
    }
}
