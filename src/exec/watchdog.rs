// src/exec/watchdog.rs

//! Deadline watchdog and the rendezvous where the outcome of a blocking
//! execution is decided.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::exec::child::ChildHandle;

/// Liveness poll interval for the watchdog and the escalator.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a blocking execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pending,
    /// Both drainers reached EOF first.
    Completed,
    /// The watchdog's budget ran out while the child was alive.
    TimedOut,
}

/// Single-decision rendezvous between the drainers, the watchdog and the
/// orchestrating task.
///
/// The first call to [`decide`](Self::decide) wins; later calls observe the
/// recorded outcome.
#[derive(Debug)]
pub struct Rendezvous {
    decision: Mutex<Decision>,
    notify: Notify,
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl Rendezvous {
    pub fn new() -> Self {
        Self {
            decision: Mutex::new(Decision::Pending),
            notify: Notify::new(),
        }
    }

    /// Record `outcome` unless a decision was already made. Returns the
    /// decision in force afterwards.
    pub fn decide(&self, outcome: Decision) -> Decision {
        let mut decision = self.lock();
        if *decision == Decision::Pending && outcome != Decision::Pending {
            *decision = outcome;
            // Single waiter; notify_one stores a permit if it isn't parked yet.
            self.notify.notify_one();
        }
        *decision
    }

    pub fn current(&self) -> Decision {
        *self.lock()
    }

    pub fn timed_out(&self) -> bool {
        self.current() == Decision::TimedOut
    }

    /// Wait until a decision has been recorded.
    pub async fn wait(&self) -> Decision {
        loop {
            let decision = self.current();
            if decision != Decision::Pending {
                return decision;
            }
            self.notify.notified().await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Decision> {
        self.decision.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Number of polls that make up `timeout`, rounded up.
pub fn poll_budget(timeout: Duration) -> u64 {
    let polls = timeout.as_millis().div_ceil(POLL_INTERVAL.as_millis()).max(1);
    u64::try_from(polls).unwrap_or(u64::MAX)
}

/// Spawn the watchdog for one child.
///
/// Polls liveness every [`POLL_INTERVAL`] for up to `timeout`. If the budget
/// runs out while the child is still alive, it records
/// [`Decision::TimedOut`]; if the child exits first it returns without
/// deciding. Resolves to the decision in force when it finished.
pub fn spawn_watchdog(
    handle: ChildHandle,
    timeout: Duration,
    rendezvous: Arc<Rendezvous>,
) -> JoinHandle<Decision> {
    tokio::spawn(async move {
        let budget = poll_budget(timeout);
        let mut polls = 0u64;

        while polls < budget && handle.is_alive() {
            tokio::time::sleep(POLL_INTERVAL).await;
            polls += 1;
        }

        if polls >= budget && handle.is_alive() {
            let decision = rendezvous.decide(Decision::TimedOut);
            if decision == Decision::TimedOut {
                info!(pid = ?handle.pid(), ?timeout, "deadline exceeded");
            } else {
                debug!(pid = ?handle.pid(), "deadline reached after drainers finished");
            }
            decision
        } else {
            debug!(pid = ?handle.pid(), polls, "child exited before deadline");
            rendezvous.current()
        }
    })
}
