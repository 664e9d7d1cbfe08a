// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::ExecutorOptions;
use crate::config::validate::validate_option_values;
use crate::errors::Result;

/// Load executor options from a TOML file.
///
/// This only performs deserialization (defaults come from
/// `ExecutorOptions::default`). Use [`load_and_validate`] to also check the
/// option values.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ExecutorOptions> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let options: ExecutorOptions = toml::from_str(&contents)?;

    Ok(options)
}

/// Load executor options from a TOML file and reject inconsistent values.
///
/// The application path itself is not checked here; that happens right
/// before launch, when the filesystem state is current.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ExecutorOptions> {
    let options = load_from_path(&path)?;
    validate_option_values(&options)?;
    Ok(options)
}
