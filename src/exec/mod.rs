// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`launcher`] spawns the child with piped stdio via
//!   `tokio::process::Command`.
//! - [`child`] owns the spawned process: a reaper task waits on it and
//!   publishes liveness and the exit status.
//! - [`drainer`] copies stdout/stderr into in-memory buffers, one task per
//!   stream.
//! - [`watchdog`] polls liveness against the deadline and holds the
//!   [`Rendezvous`] where "completed" vs "timed out" is decided once.
//! - [`escalator`] sends SIGTERM, then SIGKILL after a grace period.
//! - [`replace`] provides the `exec(2)` seam used in replace mode.
//! - [`executor`] is the state machine tying the above together.

pub mod child;
pub mod drainer;
pub mod escalator;
pub mod executor;
pub mod launcher;
pub mod replace;
pub mod watchdog;

pub use child::{ChildHandle, ProcessState};
pub use drainer::OutputBuffer;
pub use escalator::{Escalation, Escalator};
pub use executor::Executor;
pub use launcher::{Launched, launch};
pub use replace::{ProcessReplacer, SystemReplacer};
pub use watchdog::{Decision, POLL_INTERVAL, Rendezvous};
