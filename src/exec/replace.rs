// src/exec/replace.rs

//! Process-image replacement seam.
//!
//! Replace mode hands the current process over to the application through a
//! [`ProcessReplacer`]. Production code uses [`SystemReplacer`]; tests can
//! plug in a recorder that doesn't actually replace the test binary.

use std::fmt::Debug;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

pub trait ProcessReplacer: Send + Sync + Debug {
    /// Replace the current process image with `program` and `params`.
    ///
    /// Only returns on failure.
    fn replace(&self, program: &Path, params: &[String]) -> io::Error;
}

/// `execvp(3)` through `std::os::unix::process::CommandExt::exec`.
#[derive(Debug, Clone, Default)]
pub struct SystemReplacer;

impl ProcessReplacer for SystemReplacer {
    fn replace(&self, program: &Path, params: &[String]) -> io::Error {
        Command::new(program).args(params).exec()
    }
}
