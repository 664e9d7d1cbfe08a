// src/exec/executor.rs

//! The executor state machine.

use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ExecutorOptions;
use crate::config::validate::validate_application;
use crate::errors::{Result, ShexecError};
use crate::exec::child::{ChildHandle, ProcessState};
use crate::exec::drainer::{DrainError, OutputBuffer, spawn_drainer};
use crate::exec::escalator::{Escalation, Escalator};
use crate::exec::launcher::{Launched, launch};
use crate::exec::replace::{ProcessReplacer, SystemReplacer};
use crate::exec::watchdog::{Decision, Rendezvous, spawn_watchdog};
use crate::fs::{FileSystem, RealFileSystem};
use crate::output::persist_output;
use crate::types::{ExecState, Execution, Status};

/// One execution attempt of an external application.
///
/// Behaviour of [`execute`](Self::execute) depends on the options:
///
/// - `replace = true`: validate, then replace the current process image.
/// - `wait_for_completion = false`: launch and return immediately. Output is
///   not captured; the child's pipes can be taken with
///   [`take_stdout`](Self::take_stdout) / [`take_stderr`](Self::take_stderr).
/// - `wait_for_completion = true`: capture stdout/stderr concurrently and
///   return the exit status. With a positive `timeout`, a watchdog races the
///   drainers; if it wins, termination is initiated and
///   [`ShexecError::Timeout`] is returned without waiting for the kill to
///   complete.
///
/// Captured output becomes visible through [`stdout`](Self::stdout) and
/// [`stderr`](Self::stderr) after [`flush`](Self::flush).
#[derive(Debug)]
pub struct Executor {
    options: ExecutorOptions,
    fs: Arc<dyn FileSystem>,
    replacer: Arc<dyn ProcessReplacer>,

    state: ExecState,
    child: Option<ChildHandle>,
    stdout_buffer: Option<OutputBuffer>,
    stderr_buffer: Option<OutputBuffer>,
    detached_stdout: Option<ChildStdout>,
    detached_stderr: Option<ChildStderr>,
    escalation: Option<JoinHandle<Escalation>>,

    stdout: Option<String>,
    stderr: Option<String>,
    persisted: bool,
}

impl Executor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self::with_backends(options, Arc::new(RealFileSystem), Arc::new(SystemReplacer))
    }

    /// Construct with explicit filesystem and process-replacement backends.
    pub fn with_backends(
        options: ExecutorOptions,
        fs: Arc<dyn FileSystem>,
        replacer: Arc<dyn ProcessReplacer>,
    ) -> Self {
        Self {
            options,
            fs,
            replacer,
            state: ExecState::Idle,
            child: None,
            stdout_buffer: None,
            stderr_buffer: None,
            detached_stdout: None,
            detached_stderr: None,
            escalation: None,
            stdout: None,
            stderr: None,
            persisted: false,
        }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Check the application path without launching anything.
    pub fn validate(&self) -> Result<()> {
        validate_application(self.fs.as_ref(), &self.options)
    }

    pub async fn execute(&mut self) -> Result<Execution> {
        self.reset();

        if self.options.replace {
            self.replace_process()
        } else if self.options.wait_for_completion {
            self.block_process().await
        } else {
            self.fork_process()
        }
    }

    /// Materialize captured output into [`stdout`](Self::stdout) /
    /// [`stderr`](Self::stderr) and write it to the configured paths.
    ///
    /// Empty output leaves the field `None`. A no-op when nothing was
    /// captured (non-blocking mode, or before `execute`). Files are written
    /// once per execution; repeated calls only refresh the fields.
    pub fn flush(&mut self) -> Result<()> {
        let (Some(out), Some(err)) = (&self.stdout_buffer, &self.stderr_buffer) else {
            debug!("no captured output to flush");
            return Ok(());
        };

        let stdout = out.snapshot();
        let stderr = err.snapshot();
        self.stdout = non_empty_text(&stdout);
        self.stderr = non_empty_text(&stderr);

        if self.persisted {
            return Ok(());
        }
        if let Some(path) = &self.options.stdout_path {
            persist_output(self.fs.as_ref(), path, &stdout, self.options.append_stdout_path)?;
        }
        if let Some(path) = &self.options.stderr_path {
            persist_output(self.fs.as_ref(), path, &stderr, self.options.append_stderr_path)?;
        }
        self.persisted = true;

        Ok(())
    }

    /// Full internal state. A running non-blocking child that has since been
    /// reaped reports `Completed`.
    pub fn state(&self) -> ExecState {
        match (self.state, &self.child) {
            (ExecState::Running, Some(child)) if !child.is_alive() => ExecState::Completed,
            (state, _) => state,
        }
    }

    /// Coarse status: not executed, live OS state, or no longer executing.
    pub fn status(&self) -> Status {
        match self.state() {
            state if state.is_terminal() => Status::NoLongerExecuting,
            ExecState::Running => Status::Running(
                self.child
                    .as_ref()
                    .map(ChildHandle::os_status)
                    .unwrap_or("run"),
            ),
            _ => Status::NotExecuted,
        }
    }

    /// Exit status of a completed, reaped child. `None` in every other
    /// state, including after a timeout.
    pub fn result(&self) -> Option<ExitStatus> {
        match self.state() {
            ExecState::Completed => self.child.as_ref()?.exit_status(),
            _ => None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref()?.pid()
    }

    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    /// The child's stdout pipe in non-blocking mode.
    ///
    /// Pipes not taken before the next `execute` are closed, after which the
    /// earlier child gets EPIPE (or SIGPIPE) on its next write.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.detached_stdout.take()
    }

    /// The child's stderr pipe in non-blocking mode. See
    /// [`take_stdout`](Self::take_stdout).
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.detached_stderr.take()
    }

    /// Wait for the background termination started by a timeout.
    ///
    /// `None` if no timeout occurred (or this was already awaited).
    pub async fn wait_for_termination(&mut self) -> Option<Escalation> {
        let escalation = self.escalation.take()?;
        match escalation.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "termination task failed");
                None
            }
        }
    }

    fn reset(&mut self) {
        if self.detached_stdout.is_some() || self.detached_stderr.is_some() {
            debug!(
                pid = ?self.pid(),
                stdout = self.detached_stdout.is_some(),
                stderr = self.detached_stderr.is_some(),
                "closing untaken pipes of the previous child"
            );
        }
        self.state = ExecState::Idle;
        self.child = None;
        self.stdout_buffer = None;
        self.stderr_buffer = None;
        self.detached_stdout = None;
        self.detached_stderr = None;
        self.escalation = None;
        self.stdout = None;
        self.stderr = None;
        self.persisted = false;
    }

    /// Validate and return the application path.
    fn checked_application(&mut self) -> Result<String> {
        if let Err(e) = self.validate() {
            self.state = ExecState::ValidationFailed;
            return Err(e);
        }
        // Validation guarantees a non-blank path.
        Ok(self.options.application_path.clone().unwrap_or_default())
    }

    fn start(&mut self, path: &str) -> Result<Launched> {
        self.state = ExecState::Launching;
        match launch(path, &self.options.params) {
            Ok(launched) => {
                self.child = Some(launched.handle.clone());
                self.state = ExecState::Running;
                Ok(launched)
            }
            Err(e) => {
                self.state = ExecState::SpawnFailed;
                Err(e)
            }
        }
    }

    fn replace_process(&mut self) -> Result<Execution> {
        let path = self.checked_application()?;
        info!(path = %path, params = ?self.options.params, "replacing current process image");

        let source = self.replacer.replace(Path::new(&path), &self.options.params);
        self.state = ExecState::SpawnFailed;
        Err(ShexecError::Spawn { path, source })
    }

    fn fork_process(&mut self) -> Result<Execution> {
        let path = self.checked_application()?;
        let launched = self.start(&path)?;

        let pid = launched.handle.pid();
        self.detached_stdout = Some(launched.stdout);
        self.detached_stderr = Some(launched.stderr);

        info!(?pid, "child running without waiting for completion");
        Ok(Execution::Detached { pid })
    }

    async fn block_process(&mut self) -> Result<Execution> {
        let path = self.checked_application()?;
        let Launched {
            stdout,
            stderr,
            handle,
        } = self.start(&path)?;

        let rendezvous = Arc::new(Rendezvous::new());
        let out_buffer = OutputBuffer::new();
        let err_buffer = OutputBuffer::new();
        self.stdout_buffer = Some(out_buffer.clone());
        self.stderr_buffer = Some(err_buffer.clone());

        let out_task = spawn_drainer("stdout", stdout, out_buffer, Arc::clone(&rendezvous));
        let err_task = spawn_drainer("stderr", stderr, err_buffer, Arc::clone(&rendezvous));
        // Completion needs EOF on both streams and a reaped child; a child
        // that closes its stdio early is still subject to the deadline.
        let finished = {
            let rendezvous = Arc::clone(&rendezvous);
            let handle = handle.clone();
            tokio::spawn(async move {
                let drained = tokio::join!(out_task, err_task);
                let state = handle.wait().await;
                rendezvous.decide(Decision::Completed);
                (drained, state)
            })
        };

        let watchdog = self
            .options
            .timeout_duration()
            .map(|timeout| spawn_watchdog(handle.clone(), timeout, Arc::clone(&rendezvous)));

        match rendezvous.wait().await {
            Decision::TimedOut => {
                self.state = ExecState::TimedOut;
                let seconds = self.options.timeout;
                warn!(pid = ?handle.pid(), seconds, "execution expired; terminating child");

                // SIGTERM goes out before the caller sees the error; the
                // grace period and SIGKILL run in the background.
                let escalator = Escalator::new(handle, self.options.kill_grace());
                let first = escalator.send_graceful();
                self.escalation = Some(tokio::spawn(escalator.finish(first)));

                Err(ShexecError::Timeout { seconds })
            }
            Decision::Completed | Decision::Pending => {
                let ((out_res, err_res), state) =
                    finished.await.map_err(anyhow::Error::from)?;
                if let Some(watchdog) = watchdog {
                    watchdog.abort();
                }
                check_drain(out_res.map_err(anyhow::Error::from)?)?;
                check_drain(err_res.map_err(anyhow::Error::from)?)?;

                self.state = ExecState::Completed;
                match state {
                    ProcessState::Exited(status) => {
                        info!(pid = ?handle.pid(), %status, "child completed");
                        Ok(Execution::Completed(status))
                    }
                    ProcessState::Running | ProcessState::Lost => Err(ShexecError::Other(
                        anyhow::anyhow!("lost track of child process {:?}", handle.pid()),
                    )),
                }
            }
        }
    }
}

fn check_drain(result: std::result::Result<usize, DrainError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(DrainError::Io { source, .. }) => Err(ShexecError::IoError(source)),
        Err(e @ DrainError::TimedOut { .. }) => Err(ShexecError::Other(e.into())),
    }
}

fn non_empty_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}
