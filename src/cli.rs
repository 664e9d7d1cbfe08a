// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ExecutorOptions;

/// Command-line arguments for `shexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shexec",
    version,
    about = "Run an executable, capture its output, and kill it if it overruns a timeout.",
    long_about = None
)]
pub struct CliArgs {
    /// TOML file with executor options. Flags given on the command line
    /// override values from the file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds before the child is terminated (non-positive: no limit).
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    pub timeout: Option<f64>,

    /// Milliseconds between SIGTERM and SIGKILL after a timeout.
    #[arg(long, value_name = "MS")]
    pub kill_retry_ms: Option<u64>,

    /// Append captured stdout to this file.
    #[arg(long, value_name = "PATH")]
    pub stdout_path: Option<PathBuf>,

    /// Append captured stderr to this file.
    #[arg(long, value_name = "PATH")]
    pub stderr_path: Option<PathBuf>,

    /// Replace `--stdout-path` instead of appending to it.
    #[arg(long)]
    pub overwrite_stdout: bool,

    /// Replace `--stderr-path` instead of appending to it.
    #[arg(long)]
    pub overwrite_stderr: bool,

    /// Allow whitespace in the application path.
    #[arg(long)]
    pub no_injection_protection: bool,

    /// Launch and return immediately, printing the child's pid.
    #[arg(long, conflicts_with = "replace")]
    pub detach: bool,

    /// Replace this process with the application.
    #[arg(long)]
    pub replace: bool,

    /// Validate the application path and print the effective options, but
    /// don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Executable to run. May come from `--config` instead.
    #[arg(value_name = "APPLICATION")]
    pub application: Option<String>,

    /// Arguments passed to the application.
    #[arg(value_name = "PARAMS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub params: Vec<String>,
}

impl CliArgs {
    /// Layer the command-line flags over `base`.
    ///
    /// The CLI always blocks unless `--detach` is given.
    pub fn apply_to(&self, base: ExecutorOptions) -> ExecutorOptions {
        let mut options = base;

        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }
        if let Some(ms) = self.kill_retry_ms {
            options.timeout_sig_kill_retry = ms;
        }
        if let Some(ref path) = self.stdout_path {
            options.stdout_path = Some(path.clone());
        }
        if let Some(ref path) = self.stderr_path {
            options.stderr_path = Some(path.clone());
        }
        if self.overwrite_stdout {
            options.append_stdout_path = false;
        }
        if self.overwrite_stderr {
            options.append_stderr_path = false;
        }
        if self.no_injection_protection {
            options.protect_against_injection = false;
        }
        if self.replace {
            options.replace = true;
        }
        if let Some(ref application) = self.application {
            options.application_path = Some(application.clone());
            options.params = self.params.clone();
        }
        options.wait_for_completion = !self.detach;

        options
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
