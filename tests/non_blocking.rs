// tests/non_blocking.rs

use std::error::Error;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;

use shexec::exec::Executor;
use shexec::execute_non_blocking;
use shexec::types::{ExecState, Execution, Status};
use shexec_test_utils::builders::OptionsBuilder;
use shexec_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Poll until the executor reports a terminal state.
async fn wait_until_finished(executor: &Executor) {
    while executor.status() != Status::NoLongerExecuting {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn execute_returns_without_waiting() -> TestResult {
    init_tracing();

    let mut executor = Executor::new(OptionsBuilder::new("/bin/sleep").param("2").build());

    let before = Instant::now();
    let execution = executor.execute().await?;
    assert!(before.elapsed() < Duration::from_millis(200));

    assert!(matches!(execution, Execution::Detached { pid: Some(_) }));
    assert_eq!(executor.pid(), execution_pid(&execution));
    Ok(())
}

fn execution_pid(execution: &Execution) -> Option<u32> {
    match execution {
        Execution::Detached { pid } => *pid,
        Execution::Completed(_) => None,
    }
}

#[tokio::test]
async fn status_is_not_executed_before_execute() {
    let executor = Executor::new(OptionsBuilder::new("/bin/sleep").param("2").build());

    assert_eq!(executor.status(), Status::NotExecuted);
    assert_eq!(executor.status().to_string(), "not executed");
    assert_eq!(executor.state(), ExecState::Idle);
    assert_eq!(executor.result(), None);
}

#[tokio::test]
async fn status_reflects_a_live_process() -> TestResult {
    let mut executor = Executor::new(OptionsBuilder::new("/bin/sleep").param("2").build());
    executor.execute().await?;

    let status = executor.status();
    assert!(status.is_running(), "got {status:?}");
    assert!(matches!(status.to_string().as_str(), "run" | "sleep"), "got {status}");
    assert_eq!(executor.state(), ExecState::Running);
    assert_eq!(executor.result(), None);
    Ok(())
}

#[tokio::test]
async fn status_reports_no_longer_executing_after_exit() -> TestResult {
    let mut executor = Executor::new(OptionsBuilder::new("/bin/echo").param("I ran").build());
    executor.execute().await?;

    with_timeout(wait_until_finished(&executor)).await;

    assert_eq!(executor.status().to_string(), "no longer executing");
    assert_eq!(executor.state(), ExecState::Completed);
    let status = executor.result().expect("reaped child exposes its exit status");
    assert!(status.success());
    Ok(())
}

#[tokio::test]
async fn result_tracks_a_short_sleep() -> TestResult {
    let mut executor = Executor::new(OptionsBuilder::new("/bin/sleep").param("1").build());
    executor.execute().await?;
    assert_eq!(executor.result(), None);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(executor.result().is_some_and(|s| s.success()));
    Ok(())
}

#[tokio::test]
async fn flush_is_a_no_op_without_capture() -> TestResult {
    let mut executor = Executor::new(OptionsBuilder::new("/bin/echo").param("not captured").build());
    executor.execute().await?;
    with_timeout(wait_until_finished(&executor)).await;

    executor.flush()?;
    assert_eq!(executor.stdout(), None);
    assert_eq!(executor.stderr(), None);
    Ok(())
}

#[tokio::test]
async fn detached_pipes_can_be_read_by_the_caller() -> TestResult {
    let mut executor = Executor::new(
        OptionsBuilder::new("/bin/sh")
            .params(&["-c", "echo to-out; echo to-err >&2"])
            .build(),
    );
    executor.execute().await?;

    let mut stdout = executor.take_stdout().expect("stdout pipe retained");
    let mut stderr = executor.take_stderr().expect("stderr pipe retained");
    assert!(executor.take_stdout().is_none());

    let mut out = String::new();
    let mut err = String::new();
    with_timeout(stdout.read_to_string(&mut out)).await?;
    with_timeout(stderr.read_to_string(&mut err)).await?;

    assert_eq!(out, "to-out\n");
    assert_eq!(err, "to-err\n");
    Ok(())
}

#[tokio::test]
async fn execute_non_blocking_facade_returns_a_live_executor() -> TestResult {
    let before = Instant::now();
    let executor = execute_non_blocking("/bin/sleep", vec!["1".to_string()]).await?;
    assert!(before.elapsed() < Duration::from_millis(200));

    assert!(executor.status().is_running());
    with_timeout(wait_until_finished(&executor)).await;
    assert!(executor.result().is_some());
    Ok(())
}

#[tokio::test]
async fn re_executing_swaps_in_the_new_childs_pipes() -> TestResult {
    init_tracing();

    let mut executor = Executor::new(
        OptionsBuilder::new("/bin/sh")
            .params(&["-c", "sleep 0.2; echo first"])
            .build(),
    );
    executor.execute().await?;
    let first_pid = executor.pid();

    // The first child's pipes are never taken; re-executing closes them.
    executor.execute().await?;
    assert_ne!(executor.pid(), first_pid);

    let mut stdout = executor.take_stdout().expect("second child's stdout retained");
    let mut out = String::new();
    with_timeout(stdout.read_to_string(&mut out)).await?;
    assert_eq!(out, "first\n");
    assert!(executor.take_stdout().is_none());
    Ok(())
}

#[test]
fn only_terminal_states_report_no_longer_executing() {
    let terminal = [
        ExecState::Completed,
        ExecState::TimedOut,
        ExecState::ValidationFailed,
        ExecState::SpawnFailed,
    ];
    for state in terminal {
        assert!(state.is_terminal(), "{state:?}");
    }
    for state in [ExecState::Idle, ExecState::Launching, ExecState::Running] {
        assert!(!state.is_terminal(), "{state:?}");
    }
}
