// src/exec/escalator.rs

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::exec::child::ChildHandle;
use crate::exec::watchdog::POLL_INTERVAL;

/// How an escalation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// No pid was ever recorded; nothing to do.
    NoProcess,
    /// The process was gone before SIGTERM could be delivered.
    AlreadyExited,
    /// The process exited within the grace period after SIGTERM.
    Terminated,
    /// SIGKILL was sent after the grace period.
    Killed,
}

/// Result of sending one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// ESRCH: the process no longer exists.
    Gone,
    /// Any other failure (logged). Treated like `Sent` for escalation.
    Failed,
}

/// Graceful-then-forced termination of one child.
///
/// Every step treats "no such process" as success, so running it against a
/// process that already exited, or running it twice, is harmless.
#[derive(Debug, Clone)]
pub struct Escalator {
    handle: ChildHandle,
    grace: Duration,
}

impl Escalator {
    pub fn new(handle: ChildHandle, grace: Duration) -> Self {
        Self { handle, grace }
    }

    /// Full sequence: SIGTERM, wait up to the grace period, SIGKILL.
    pub async fn run(self) -> Escalation {
        let first = self.send_graceful();
        self.finish(first).await
    }

    /// Send SIGTERM. Returns `None` if there is no pid.
    pub fn send_graceful(&self) -> Option<Delivery> {
        let pid = self.handle.pid()?;
        if !self.handle.is_alive() {
            debug!(pid, "child already reaped; skipping SIGTERM");
            return Some(Delivery::Gone);
        }
        info!(pid, "sending SIGTERM");
        Some(send_signal(pid, Signal::SIGTERM))
    }

    /// Remainder of the sequence after [`send_graceful`](Self::send_graceful).
    pub async fn finish(self, first: Option<Delivery>) -> Escalation {
        let Some(pid) = self.handle.pid() else {
            return Escalation::NoProcess;
        };
        match first {
            None => return Escalation::NoProcess,
            Some(Delivery::Gone) => return Escalation::AlreadyExited,
            Some(Delivery::Sent) | Some(Delivery::Failed) => {}
        }

        let retries = self.grace.as_millis() / POLL_INTERVAL.as_millis();
        let mut polls = 0u128;
        while polls < retries && self.is_alive(pid) {
            tokio::time::sleep(POLL_INTERVAL).await;
            polls += 1;
        }

        if !self.is_alive(pid) {
            debug!(pid, "child exited after SIGTERM");
            return Escalation::Terminated;
        }

        warn!(pid, grace = ?self.grace, "child survived SIGTERM; sending SIGKILL");
        match send_signal(pid, Signal::SIGKILL) {
            Delivery::Gone => Escalation::Terminated,
            Delivery::Sent | Delivery::Failed => Escalation::Killed,
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.handle.is_alive() && process_exists(pid)
    }
}

/// Whether a process with this id exists (signal 0).
pub fn process_exists(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        // EPERM: it exists, we just may not signal it.
        Err(_) => true,
    }
}

fn send_signal(pid: u32, signal: Signal) -> Delivery {
    let Ok(raw) = i32::try_from(pid) else {
        return Delivery::Gone;
    };
    match kill(Pid::from_raw(raw), signal) {
        Ok(()) => Delivery::Sent,
        Err(Errno::ESRCH) => {
            debug!(pid, ?signal, "process already gone");
            Delivery::Gone
        }
        Err(e) => {
            warn!(pid, ?signal, error = %e, "failed to signal process");
            Delivery::Failed
        }
    }
}
