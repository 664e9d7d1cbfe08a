#![allow(dead_code)]

use std::path::Path;

use shexec::config::ExecutorOptions;

/// Builder for `ExecutorOptions` to simplify test setup.
pub struct OptionsBuilder {
    options: ExecutorOptions,
}

impl OptionsBuilder {
    pub fn new(application_path: &str) -> Self {
        Self {
            options: ExecutorOptions {
                application_path: Some(application_path.to_string()),
                ..ExecutorOptions::default()
            },
        }
    }

    /// Blocking execution of `application_path`.
    pub fn blocking(application_path: &str) -> Self {
        Self::new(application_path).wait(true)
    }

    pub fn param(mut self, param: &str) -> Self {
        self.options.params.push(param.to_string());
        self
    }

    pub fn params(mut self, params: &[&str]) -> Self {
        self.options
            .params
            .extend(params.iter().map(|p| p.to_string()));
        self
    }

    pub fn wait(mut self, val: bool) -> Self {
        self.options.wait_for_completion = val;
        self
    }

    pub fn timeout(mut self, seconds: f64) -> Self {
        self.options.timeout = seconds;
        self
    }

    pub fn kill_retry_ms(mut self, ms: u64) -> Self {
        self.options.timeout_sig_kill_retry = ms;
        self
    }

    pub fn protect_against_injection(mut self, val: bool) -> Self {
        self.options.protect_against_injection = val;
        self
    }

    pub fn stdout_path(mut self, path: impl AsRef<Path>, append: bool) -> Self {
        self.options.stdout_path = Some(path.as_ref().to_path_buf());
        self.options.append_stdout_path = append;
        self
    }

    pub fn stderr_path(mut self, path: impl AsRef<Path>, append: bool) -> Self {
        self.options.stderr_path = Some(path.as_ref().to_path_buf());
        self.options.append_stderr_path = append;
        self
    }

    pub fn replace(mut self, val: bool) -> Self {
        self.options.replace = val;
        self
    }

    pub fn build(self) -> ExecutorOptions {
        self.options
    }
}
