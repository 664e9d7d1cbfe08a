// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Options for one execution attempt.
///
/// Every field is optional in a TOML file; missing keys take the defaults
/// below and unknown keys are rejected.
///
/// ```toml
/// application_path = "/bin/sleep"
/// params = ["5"]
/// wait_for_completion = true
/// timeout = 1
/// timeout_sig_kill_retry = 500
/// stdout_path = "/tmp/sleep.out"
/// append_stdout_path = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorOptions {
    /// Seconds before the child is terminated. Non-positive means unbounded.
    pub timeout: f64,

    /// Reject application paths containing whitespace or control characters.
    pub protect_against_injection: bool,

    /// File that captured stdout is written to on `flush`.
    pub stdout_path: Option<PathBuf>,

    /// File that captured stderr is written to on `flush`.
    pub stderr_path: Option<PathBuf>,

    /// Append to `stdout_path` (default) instead of replacing it.
    pub append_stdout_path: bool,

    /// Append to `stderr_path` (default) instead of replacing it.
    pub append_stderr_path: bool,

    /// Replace the current process image with the application. Never returns
    /// on success; all other options are ignored.
    pub replace: bool,

    /// Block until the child exits and capture its output.
    pub wait_for_completion: bool,

    /// Milliseconds between SIGTERM and SIGKILL when a timeout fires.
    pub timeout_sig_kill_retry: u64,

    pub application_path: Option<String>,

    pub params: Vec<String>,
}

pub const DEFAULT_TIMEOUT: f64 = -1.0;
pub const DEFAULT_SIG_KILL_RETRY_MS: u64 = 500;

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            protect_against_injection: true,
            stdout_path: None,
            stderr_path: None,
            append_stdout_path: true,
            append_stderr_path: true,
            replace: false,
            wait_for_completion: false,
            timeout_sig_kill_retry: DEFAULT_SIG_KILL_RETRY_MS,
            application_path: None,
            params: Vec::new(),
        }
    }
}

impl ExecutorOptions {
    /// Options for running `application_path` with `params`, everything else
    /// defaulted.
    pub fn for_application(application_path: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            application_path: Some(application_path.into()),
            params,
            ..Self::default()
        }
    }

    /// The deadline, if one applies.
    pub fn timeout_duration(&self) -> Option<Duration> {
        if self.timeout > 0.0 {
            Duration::try_from_secs_f64(self.timeout).ok()
        } else {
            None
        }
    }

    /// Grace period between SIGTERM and SIGKILL.
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.timeout_sig_kill_retry)
    }
}
