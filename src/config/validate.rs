// src/config/validate.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::ExecutorOptions;
use crate::errors::{Result, ShexecError};
use crate::fs::FileSystem;

pub const NO_APPLICATION_PATH: &str = "No application path provided";
pub const APPLICATION_NOT_FOUND: &str = "Application path not found";
pub const APPLICATION_NOT_EXECUTABLE: &str = "Application path not executable";
pub const SUSPECTED_INJECTION: &str = "Suspected injection vulnerability due to whitespace or control character in application_path. Turn off strict checking if you are sure by setting protect_against_injection to false";

/// Run every precondition check on an application path and collect the
/// failures. An empty vector means the path is valid.
///
/// Existence and executability are checked first, then the injection
/// heuristic (only while `protect_against_injection` is on).
pub fn check_application_path(
    fs: &dyn FileSystem,
    application_path: Option<&str>,
    protect_against_injection: bool,
) -> Vec<String> {
    let mut errors = Vec::new();

    let path = match application_path {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            errors.push(NO_APPLICATION_PATH.to_string());
            return errors;
        }
    };

    if fs.exists(Path::new(path)) {
        if !fs.is_executable(Path::new(path)) {
            errors.push(APPLICATION_NOT_EXECUTABLE.to_string());
        }
    } else {
        errors.push(APPLICATION_NOT_FOUND.to_string());
    }

    if protect_against_injection && possible_injection(path) {
        errors.push(SUSPECTED_INJECTION.to_string());
    }

    errors
}

/// Check the application path of `options`, failing with one aggregated
/// [`ShexecError::Validation`].
pub fn validate_application(fs: &dyn FileSystem, options: &ExecutorOptions) -> Result<()> {
    let errors = check_application_path(
        fs,
        options.application_path.as_deref(),
        options.protect_against_injection,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        debug!(?errors, "application path rejected");
        Err(ShexecError::Validation(errors.join(",")))
    }
}

/// Sanity checks on option values read from a config file.
pub fn validate_option_values(options: &ExecutorOptions) -> Result<()> {
    if options.timeout.is_nan() {
        return Err(ShexecError::ConfigError(
            "timeout must be a number of seconds (got NaN)".to_string(),
        ));
    }

    if options.replace && (options.stdout_path.is_some() || options.stderr_path.is_some()) {
        return Err(ShexecError::ConfigError(
            "replace = true cannot be combined with stdout_path/stderr_path".to_string(),
        ));
    }

    if options.replace && options.timeout_duration().is_some() {
        return Err(ShexecError::ConfigError(
            "replace = true cannot be combined with a timeout".to_string(),
        ));
    }

    Ok(())
}

fn possible_injection(path: &str) -> bool {
    path.chars().any(|c| c.is_whitespace() || c.is_control())
}
