// src/exec/child.rs

use std::process::ExitStatus;

use tokio::process::Child;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Lifecycle of the OS process as seen by its reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(ExitStatus),
    /// Waiting on the child failed; its exit status is unknown.
    Lost,
}

/// Shared view of one spawned child.
///
/// Creating the handle moves the `Child` into a reaper task, so the process
/// is waited on exactly once. Clones observe the same state without
/// blocking.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    pid: Option<u32>,
    state: watch::Receiver<ProcessState>,
}

impl ChildHandle {
    /// Take ownership of `child` and reap it in the background.
    pub fn reap(mut child: Child) -> Self {
        let pid = child.id();
        let (tx, rx) = watch::channel(ProcessState::Running);

        tokio::spawn(async move {
            let state = match child.wait().await {
                Ok(status) => {
                    debug!(?pid, %status, "child reaped");
                    ProcessState::Exited(status)
                }
                Err(e) => {
                    warn!(?pid, error = %e, "failed to wait for child process");
                    ProcessState::Lost
                }
            };
            tx.send_replace(state);
        });

        Self { pid, state: rx }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        *self.state.borrow()
    }

    /// True until the reaper has collected the child.
    pub fn is_alive(&self) -> bool {
        self.state() == ProcessState::Running
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self.state() {
            ProcessState::Exited(status) => Some(status),
            _ => None,
        }
    }

    /// Wait until the child has been reaped.
    pub async fn wait(&self) -> ProcessState {
        let mut rx = self.state.clone();
        let state = match rx.wait_for(|s| *s != ProcessState::Running).await {
            Ok(state) => *state,
            Err(_) => ProcessState::Lost,
        };
        state
    }

    /// Scheduler state of the live process, in the vocabulary of a status
    /// query: `"run"`, `"sleep"`, `"stopped"`, `"zombie"`.
    ///
    /// Falls back to `"run"` where `/proc` is unavailable.
    pub fn os_status(&self) -> &'static str {
        self.pid.and_then(proc_state).unwrap_or("run")
    }
}

fn proc_state(pid: u32) -> Option<&'static str> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // Format is "pid (comm) S ...", and comm may itself contain ')'.
    let rest = &stat[stat.rfind(')')? + 1..];
    let state = rest.split_whitespace().next()?;
    Some(match state {
        "R" => "run",
        "S" | "D" | "I" => "sleep",
        "T" | "t" => "stopped",
        "Z" | "X" => "zombie",
        _ => "run",
    })
}
