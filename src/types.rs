// src/types.rs

use std::fmt;
use std::process::ExitStatus;

/// Internal lifecycle of one [`Executor`](crate::exec::Executor).
///
/// `Completed`, `TimedOut`, `ValidationFailed` and `SpawnFailed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecState {
    #[default]
    Idle,
    Launching,
    Running,
    Completed,
    TimedOut,
    ValidationFailed,
    SpawnFailed,
}

impl ExecState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecState::Completed
                | ExecState::TimedOut
                | ExecState::ValidationFailed
                | ExecState::SpawnFailed
        )
    }
}

/// Coarse, three-valued projection of [`ExecState`] returned by
/// `Executor::status`.
///
/// - `NotExecuted`: `execute` has not been called.
/// - `Running`: the child is alive; carries the OS scheduler state
///   (`"run"`, `"sleep"`, `"stopped"`, ...).
/// - `NoLongerExecuting`: any terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotExecuted,
    Running(&'static str),
    NoLongerExecuting,
}

impl Status {
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotExecuted => f.write_str("not executed"),
            Status::Running(state) => f.write_str(state),
            Status::NoLongerExecuting => f.write_str("no longer executing"),
        }
    }
}

/// What a successful `execute` call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Blocking mode: the child exited and was reaped.
    Completed(ExitStatus),
    /// Non-blocking mode: the child was launched and keeps running.
    Detached { pid: Option<u32> },
}

impl Execution {
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Execution::Completed(status) => Some(*status),
            Execution::Detached { .. } => None,
        }
    }
}

/// Result of the blocking convenience entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    pub status: ExitStatus,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl CapturedRun {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}
