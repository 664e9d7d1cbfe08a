// src/config/mod.rs

//! Executor configuration.
//!
//! - [`model`] defines [`ExecutorOptions`] and its defaults.
//! - [`loader`] reads options from a TOML file.
//! - [`validate`] holds the pre-launch checks on the application path and
//!   the sanity checks on option values.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::ExecutorOptions;
pub use validate::{check_application_path, validate_application, validate_option_values};
