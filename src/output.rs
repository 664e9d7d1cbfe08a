// src/output.rs

//! Persistence of captured output to configured files.

use std::path::Path;

use tracing::debug;

use crate::errors::{Result, ShexecError};
use crate::fs::FileSystem;

/// Write `contents` to `path`.
///
/// With `append` the bytes go after any existing content; otherwise an
/// existing file is removed first. The parent directory is never created,
/// so a missing directory surfaces as [`ShexecError::OutputPersist`].
pub fn persist_output(
    fs: &dyn FileSystem,
    path: &Path,
    contents: &[u8],
    append: bool,
) -> Result<()> {
    let wrap = |source| ShexecError::OutputPersist {
        path: path.to_path_buf(),
        source,
    };

    if !append {
        fs.remove_file(path).map_err(wrap)?;
    }
    fs.append(path, contents).map_err(wrap)?;

    debug!(path = %path.display(), bytes = contents.len(), append, "captured output persisted");
    Ok(())
}
