// src/fs/mod.rs

use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub mod mock;

/// The filesystem operations the executor needs: path checks before launch
/// and output persistence after capture.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;

    /// True for a regular file with at least one execute bit set.
    fn is_executable(&self, path: &Path) -> bool;

    /// Append `contents` to `path`, creating the file (but not its parent
    /// directory) if needed.
    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Remove a file. A file that does not exist is not an error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        match fs::metadata(path) {
            Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(contents)?;
        file.flush()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
