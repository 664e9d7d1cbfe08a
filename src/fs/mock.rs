// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { contents: Vec<u8>, executable: bool },
    Dir,
}

/// In-memory filesystem for tests.
///
/// Parent directories of added files are created implicitly; `append` to a
/// path whose parent was never added fails with `NotFound`, like the real
/// thing.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.add_dir("/");
        fs
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.lock();
        Self::ensure_dir(&mut entries, path.as_ref());
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), contents.into(), false);
    }

    pub fn add_executable(&self, path: impl AsRef<Path>) {
        self.insert_file(path.as_ref(), Vec::new(), true);
    }

    /// Contents of a file, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().get(path.as_ref()) {
            Some(MockEntry::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    fn insert_file(&self, path: &Path, contents: Vec<u8>, executable: bool) {
        let mut entries = self.lock();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(&mut entries, parent);
        }
        entries.insert(path.to_path_buf(), MockEntry::File { contents, executable });
    }

    fn ensure_dir(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if path.as_os_str().is_empty() {
            return;
        }
        entries.entry(path.to_path_buf()).or_insert(MockEntry::Dir);
        if let Some(parent) = path.parent() {
            if parent != path {
                Self::ensure_dir(entries, parent);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.lock().get(path),
            Some(MockEntry::File { executable: true, .. })
        )
    }

    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut entries = self.lock();

        let parent_is_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                matches!(entries.get(parent), Some(MockEntry::Dir))
            }
            _ => true,
        };
        if !parent_is_dir {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            ));
        }

        match entries
            .entry(path.to_path_buf())
            .or_insert_with(|| MockEntry::File {
                contents: Vec::new(),
                executable: false,
            }) {
            MockEntry::File { contents: existing, .. } => {
                existing.extend_from_slice(contents);
                Ok(())
            }
            MockEntry::Dir => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {}", path.display()),
            )),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.lock();
        match entries.get(path) {
            Some(MockEntry::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {}", path.display()),
            )),
            Some(MockEntry::File { .. }) => {
                entries.remove(path);
                Ok(())
            }
            None => Ok(()),
        }
    }
}
