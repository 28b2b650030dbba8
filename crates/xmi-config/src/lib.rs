//! XMI kernel configuration
//!
//! Says which kernel library to load and how to run it:
//! - `xmi.toml` in the simulation project: library path, dependency
//!   directories, working directory, timing
//! - `~/.xmi/config.toml`: per-user defaults for timing and dependencies
//!
//! Precedence, lowest first: user defaults, `xmi.toml`, `XMI_LIBRARY` /
//! `XMI_WORKING_DIRECTORY` / `XMI_TIMING`, then options set in code.
//!
//! ```no_run
//! use xmi_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new("sim"))?;
//! let library = config.require_library_path()?;
//! # Ok::<(), xmi_config::ConfigError>(())
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Errors while locating, reading or checking configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration at {0}")]
    NotFound(PathBuf),

    #[error("Could not read configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed TOML in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    /// A setting needed to build a wrapper is absent
    #[error("Missing required setting '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot locate the home directory for ~/.xmi")]
    HomeNotFound,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;
