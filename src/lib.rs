// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod output;
pub mod types;

use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ExecutorOptions, load_and_validate};
use crate::errors::{Result, ShexecError};
use crate::exec::Executor;
use crate::types::{CapturedRun, Execution};

/// Exit code used by the CLI when the child overran its timeout, matching
/// `timeout(1)`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Run `application_path` to completion and return its exit status and
/// captured output.
pub async fn execute_blocking(
    application_path: impl Into<String>,
    params: Vec<String>,
) -> Result<CapturedRun> {
    let options = ExecutorOptions {
        wait_for_completion: true,
        ..ExecutorOptions::for_application(application_path, params)
    };
    run_captured(options).await
}

/// Like [`execute_blocking`], but terminate the child after `timeout`
/// seconds and fail with [`ShexecError::Timeout`].
pub async fn execute_and_timeout_after(
    application_path: impl Into<String>,
    params: Vec<String>,
    timeout: f64,
) -> Result<CapturedRun> {
    let options = ExecutorOptions {
        wait_for_completion: true,
        timeout,
        ..ExecutorOptions::for_application(application_path, params)
    };
    run_captured(options).await
}

/// Launch `application_path` without waiting. The returned executor answers
/// `status()` / `result()` for the running child.
pub async fn execute_non_blocking(
    application_path: impl Into<String>,
    params: Vec<String>,
) -> Result<Executor> {
    let options = ExecutorOptions {
        wait_for_completion: false,
        ..ExecutorOptions::for_application(application_path, params)
    };
    let mut executor = Executor::new(options);
    executor.execute().await?;
    Ok(executor)
}

async fn run_captured(options: ExecutorOptions) -> Result<CapturedRun> {
    let mut executor = Executor::new(options);
    let execution = executor.execute().await?;
    executor.flush()?;

    let status = execution.exit_status().ok_or_else(|| {
        ShexecError::Other(anyhow::anyhow!("blocking execution returned without an exit status"))
    })?;

    Ok(CapturedRun {
        status,
        stdout: executor.stdout().map(str::to_string),
        stderr: executor.stderr().map(str::to_string),
    })
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - option loading (`--config` file, then CLI flags)
/// - validation / dry-run
/// - execution and output echoing
/// - waiting for a timed-out child to be terminated before exiting
pub async fn run(args: CliArgs) -> Result<i32> {
    let base = match args.config {
        Some(ref path) => load_and_validate(path)?,
        None => ExecutorOptions::default(),
    };
    let options = args.apply_to(base);
    let mut executor = Executor::new(options);

    if args.dry_run {
        executor.validate()?;
        print_dry_run(executor.options());
        return Ok(0);
    }

    match executor.execute().await {
        Ok(Execution::Completed(status)) => {
            executor.flush()?;
            echo_output(&executor)?;
            info!(%status, "done");
            Ok(exit_code(status))
        }
        Ok(Execution::Detached { pid }) => {
            match pid {
                Some(pid) => println!("{pid}"),
                None => warn!("child launched but its pid is unknown"),
            }
            Ok(0)
        }
        Err(ShexecError::Timeout { seconds }) => {
            let outcome = executor.wait_for_termination().await;
            debug!(?outcome, "timed-out child terminated");
            executor.flush()?;
            echo_output(&executor)?;
            eprintln!("shexec: execution expired after {seconds}s");
            Ok(TIMEOUT_EXIT_CODE)
        }
        Err(e) => Err(e),
    }
}

/// Exit code of the child, or `128 + signal` if it was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

fn echo_output(executor: &Executor) -> Result<()> {
    if let Some(out) = executor.stdout() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
    }
    if let Some(err) = executor.stderr() {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(err.as_bytes())?;
        stderr.flush()?;
    }
    Ok(())
}

/// Simple dry-run output: the effective options.
fn print_dry_run(options: &ExecutorOptions) {
    println!("shexec dry-run");
    println!(
        "  application_path = {}",
        options.application_path.as_deref().unwrap_or("<unset>")
    );
    if !options.params.is_empty() {
        println!("  params = {:?}", options.params);
    }
    match options.timeout_duration() {
        Some(timeout) => println!("  timeout = {timeout:?}"),
        None => println!("  timeout = none"),
    }
    println!("  timeout_sig_kill_retry = {}ms", options.timeout_sig_kill_retry);
    println!("  protect_against_injection = {}", options.protect_against_injection);
    println!("  wait_for_completion = {}", options.wait_for_completion);
    println!("  replace = {}", options.replace);
    if let Some(ref path) = options.stdout_path {
        println!(
            "  stdout_path = {} (append: {})",
            path.display(),
            options.append_stdout_path
        );
    }
    if let Some(ref path) = options.stderr_path {
        println!(
            "  stderr_path = {} (append: {})",
            path.display(),
            options.append_stderr_path
        );
    }

    debug!("dry-run complete (no execution)");
}
