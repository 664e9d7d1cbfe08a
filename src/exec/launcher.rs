// src/exec/launcher.rs

use std::process::Stdio;

use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::info;

use crate::errors::{Result, ShexecError};
use crate::exec::child::ChildHandle;

/// Streams and process handle of a freshly spawned child.
#[derive(Debug)]
pub struct Launched {
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
    pub handle: ChildHandle,
}

/// Spawn `application_path` with `params` as argv, stdout/stderr piped.
///
/// Stdin is piped and closed straight away; children never get input. The
/// path is passed to the OS as-is, no shell is involved.
///
/// Must be called from within a Tokio runtime.
pub fn launch(application_path: &str, params: &[String]) -> Result<Launched> {
    info!(path = %application_path, ?params, "launching child process");

    let mut cmd = Command::new(application_path);
    cmd.args(params)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);

    let mut child = cmd.spawn().map_err(|source| ShexecError::Spawn {
        path: application_path.to_string(),
        source,
    })?;

    drop(child.stdin.take());

    let missing = |stream: &str| ShexecError::Spawn {
        path: application_path.to_string(),
        source: std::io::Error::other(format!("child {stream} was not captured")),
    };
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

    let handle = ChildHandle::reap(child);
    info!(pid = ?handle.pid(), "child process started");

    Ok(Launched {
        stdout,
        stderr,
        handle,
    })
}
