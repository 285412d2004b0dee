//! Logging infrastructure for romsum.
//!
//! Warnings and recoverable errors about individual inputs are reported
//! through this logger, so the level markers double as the severity markers
//! users see on stderr.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::{IsTerminal, Write};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level
    pub level: LevelFilter,
    /// Show timestamps
    pub timestamps: bool,
    /// Show module path
    pub module_path: bool,
    /// Colorize level markers
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            timestamps: false,
            module_path: false,
            color: stderr_is_terminal(),
        }
    }
}

impl LogConfig {
    /// Create a log config from application config.
    pub fn from_config(config: &Config) -> Self {
        let level = parse_level(&config.logging.log_level);

        Self {
            level,
            timestamps: config.logging.timestamps,
            module_path: level == LevelFilter::Debug || level == LevelFilter::Trace,
            color: stderr_is_terminal(),
        }
    }

    /// Create a verbose log config for CLI.
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Debug,
            timestamps: true,
            module_path: true,
            color: stderr_is_terminal(),
        }
    }

    /// Create a quiet log config (errors only).
    pub fn quiet() -> Self {
        Self {
            level: LevelFilter::Error,
            timestamps: false,
            module_path: false,
            color: stderr_is_terminal(),
        }
    }
}

/// Colored markers only make sense when stderr is an interactive terminal.
fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

fn level_marker(level: log::Level, color: bool) -> &'static str {
    match (level, color) {
        (log::Level::Error, true) => "\x1b[31mERROR\x1b[0m",
        (log::Level::Warn, true) => "\x1b[33mWARN\x1b[0m ",
        (log::Level::Info, true) => "\x1b[32mINFO\x1b[0m ",
        (log::Level::Debug, true) => "\x1b[34mDEBUG\x1b[0m",
        (log::Level::Trace, true) => "\x1b[35mTRACE\x1b[0m",
        (log::Level::Error, false) => "ERROR",
        (log::Level::Warn, false) => "WARN ",
        (log::Level::Info, false) => "INFO ",
        (log::Level::Debug, false) => "DEBUG",
        (log::Level::Trace, false) => "TRACE",
    }
}

/// Initialize the logging system.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let mut builder = Builder::new();

    builder.filter_level(config.level);
    builder.target(Target::Stderr);

    let LogConfig {
        timestamps,
        module_path,
        color,
        level,
    } = config;

    builder.format(move |buf, record| {
        let mut output = String::new();

        if timestamps {
            output.push_str(&format!("{} ", Local::now().format("%Y-%m-%d %H:%M:%S")));
        }

        output.push_str(&format!("[{}] ", level_marker(record.level(), color)));

        if module_path {
            if let Some(path) = record.module_path() {
                output.push_str(&format!("{}: ", path));
            }
        }

        output.push_str(&format!("{}", record.args()));

        writeln!(buf, "{}", output)
    });

    builder
        .try_init()
        .map_err(|e| Error::Other(anyhow::anyhow!("Failed to initialize logger: {}", e)))?;

    log::debug!("Logging initialized with level: {:?}", level);
    Ok(())
}
