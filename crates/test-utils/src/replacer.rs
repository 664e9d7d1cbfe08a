use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use shexec::exec::ProcessReplacer;

/// A process replacer that:
/// - records the program and params it was asked to exec
/// - returns an error instead of replacing the test process.
#[derive(Debug, Clone, Default)]
pub struct RecordingReplacer {
    calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl RecordingReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl ProcessReplacer for RecordingReplacer {
    fn replace(&self, program: &Path, params: &[String]) -> io::Error {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), params.to_vec()));
        io::Error::other("process replacement recorded instead of performed")
    }
}
