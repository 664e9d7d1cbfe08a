// src/logging.rs

//! `tracing` subscriber for the `shexec` binary.
//!
//! The level comes from `--log-level`, else `SHEXEC_LOG`, else `info`.
//! Output goes to stderr; stdout belongs to the child's captured output.

use anyhow::Result;
use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .map(Level::from)
        .or_else(|| std::env::var("SHEXEC_LOG").ok().and_then(|s| parse_level_str(&s)))
        .unwrap_or(Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Parse a level name the way `--log-level` does, ignoring case and
/// surrounding whitespace.
pub fn parse_level_str(s: &str) -> Option<Level> {
    LogLevel::from_str(s.trim(), true).ok().map(Level::from)
}
