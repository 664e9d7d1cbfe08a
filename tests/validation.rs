// tests/validation.rs

use std::sync::Arc;

use proptest::prelude::*;
use tempfile::tempdir;

use shexec::config::ExecutorOptions;
use shexec::config::validate::{
    APPLICATION_NOT_EXECUTABLE, APPLICATION_NOT_FOUND, NO_APPLICATION_PATH, SUSPECTED_INJECTION,
    check_application_path,
};
use shexec::errors::ShexecError;
use shexec::exec::Executor;
use shexec::fs::mock::MockFileSystem;
use shexec::fs::RealFileSystem;
use shexec::types::{ExecState, Status};
use shexec_test_utils::builders::OptionsBuilder;
use shexec_test_utils::replacer::RecordingReplacer;
use shexec_test_utils::scripts::{path_str, write_plain_file, write_script};

fn validation_message(options: ExecutorOptions) -> String {
    match Executor::new(options).validate() {
        Err(ShexecError::Validation(msg)) => msg,
        Err(e) => panic!("Expected Validation error, got: {:?}", e),
        Ok(()) => panic!("Expected error, got Ok"),
    }
}

fn mock_executor(fs: &MockFileSystem, options: ExecutorOptions) -> Executor {
    Executor::with_backends(options, Arc::new(fs.clone()), Arc::new(RecordingReplacer::new()))
}

#[test]
fn missing_application_path_is_rejected() {
    let msg = validation_message(ExecutorOptions::default());
    assert_eq!(msg, NO_APPLICATION_PATH);
}

#[test]
fn blank_application_path_is_rejected() {
    for blank in ["", "   ", "\t"] {
        let msg = validation_message(OptionsBuilder::new(blank).build());
        assert_eq!(msg, NO_APPLICATION_PATH, "path {blank:?}");
    }
}

#[test]
fn nonexistent_application_path_is_rejected() {
    let msg = validation_message(OptionsBuilder::new("/kjsdfhgjkgsjk").build());
    assert_eq!(msg, APPLICATION_NOT_FOUND);
}

#[test]
fn non_executable_application_path_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_plain_file(dir.path(), "plain.txt");

    let msg = validation_message(OptionsBuilder::new(path_str(&path)).build());
    assert_eq!(msg, APPLICATION_NOT_EXECUTABLE);
}

#[test]
fn executable_script_passes_validation() {
    let dir = tempdir().unwrap();
    let path = write_script(dir.path(), "ok.sh", "echo ok");

    Executor::new(OptionsBuilder::new(path_str(&path)).build())
        .validate()
        .unwrap();
}

#[test]
fn space_in_path_is_suspected_injection_even_when_executable() {
    let dir = tempdir().unwrap();
    let path = write_script(dir.path(), "with space.sh", "echo hi");

    let msg = validation_message(OptionsBuilder::new(path_str(&path)).build());
    assert_eq!(msg, SUSPECTED_INJECTION);
}

#[test]
fn space_in_path_is_allowed_without_injection_protection() {
    let dir = tempdir().unwrap();
    let path = write_script(dir.path(), "with space.sh", "echo hi");

    Executor::new(
        OptionsBuilder::new(path_str(&path))
            .protect_against_injection(false)
            .build(),
    )
    .validate()
    .unwrap();
}

#[test]
fn failures_are_aggregated_into_one_message() {
    let msg = validation_message(OptionsBuilder::new("/no such/program").build());
    assert_eq!(msg, format!("{APPLICATION_NOT_FOUND},{SUSPECTED_INJECTION}"));
}

#[test]
fn mock_filesystem_drives_existence_checks() {
    let fs = MockFileSystem::new();
    fs.add_executable("/opt/tools/run");
    fs.add_file("/opt/tools/readme", "text");

    assert!(check_application_path(&fs, Some("/opt/tools/run"), true).is_empty());
    assert_eq!(
        check_application_path(&fs, Some("/opt/tools/readme"), true),
        vec![APPLICATION_NOT_EXECUTABLE.to_string()]
    );
    assert_eq!(
        check_application_path(&fs, Some("/opt/tools"), true),
        vec![APPLICATION_NOT_EXECUTABLE.to_string()]
    );
    assert_eq!(
        check_application_path(&fs, None, true),
        vec![NO_APPLICATION_PATH.to_string()]
    );
}

#[tokio::test]
async fn execute_fails_fast_on_validation_without_spawning() {
    let fs = MockFileSystem::new();
    let mut executor = mock_executor(&fs, OptionsBuilder::blocking("/missing").build());

    let err = executor.execute().await.unwrap_err();
    assert!(matches!(err, ShexecError::Validation(ref msg) if msg == APPLICATION_NOT_FOUND));
    assert_eq!(executor.state(), ExecState::ValidationFailed);
    assert_eq!(executor.status(), Status::NoLongerExecuting);
    assert_eq!(executor.pid(), None);
    assert_eq!(executor.result(), None);
}

#[tokio::test]
async fn every_mode_validates_before_running() {
    for options in [
        ExecutorOptions::default(),
        ExecutorOptions {
            wait_for_completion: true,
            ..ExecutorOptions::default()
        },
        ExecutorOptions {
            replace: true,
            ..ExecutorOptions::default()
        },
    ] {
        let err = Executor::new(options).execute().await.unwrap_err();
        assert!(
            matches!(err, ShexecError::Validation(ref msg) if msg == NO_APPLICATION_PATH),
            "got {err:?}"
        );
    }
}

proptest! {
    #[test]
    fn any_path_with_a_space_is_flagged(
        prefix in "/[a-z]{1,8}",
        suffix in "[a-z]{0,8}",
        executable in any::<bool>(),
    ) {
        let path = format!("{prefix} {suffix}");
        let fs = MockFileSystem::new();
        if executable {
            fs.add_executable(&path);
        }

        let errors = check_application_path(&fs, Some(&path), true);
        prop_assert!(errors.contains(&SUSPECTED_INJECTION.to_string()));
        prop_assert_eq!(errors.last().map(String::as_str), Some(SUSPECTED_INJECTION));
    }

    #[test]
    fn blank_paths_only_report_missing_path(blank in "[ \t]{0,6}") {
        let errors = check_application_path(&RealFileSystem, Some(&blank), true);
        prop_assert_eq!(errors, vec![NO_APPLICATION_PATH.to_string()]);
    }
}
