//! Project Configuration (xmi.toml)
//!
//! Describes which kernel library to load and how to run it.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_FILE: &str = "xmi.toml";

/// Project configuration from xmi.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Kernel library location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryConfig>,

    /// Run settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfig>,
}

/// Kernel library settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Path to the shared library exposing the XMI entry points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Directories holding the library's own dependencies
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PathBuf>,
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Directory the kernel resolves its input files against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,

    /// Collect per-entry-point timings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    ///
    /// Relative paths are resolved against the directory holding the file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let mut config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error: e,
            })?;

        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(path) = self.library.as_ref().and_then(|l| l.path.as_ref()) {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "library.path".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Make every relative path absolute with respect to `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if let Some(library) = self.library.as_mut() {
            if let Some(path) = library.path.as_mut() {
                *path = join_relative(base, path);
            }
            for dir in &mut library.dependencies {
                *dir = join_relative(base, dir);
            }
        }
        if let Some(dir) = self
            .run
            .as_mut()
            .and_then(|r| r.working_directory.as_mut())
        {
            *dir = join_relative(base, dir);
        }
    }

    /// Configured library path
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_ref().and_then(|l| l.path.as_deref())
    }

    /// Configured dependency directories
    pub fn dependencies(&self) -> &[PathBuf] {
        self.library
            .as_ref()
            .map(|l| l.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Configured working directory
    pub fn working_directory(&self) -> Option<&Path> {
        self.run.as_ref().and_then(|r| r.working_directory.as_deref())
    }

    /// Configured timing flag
    pub fn timing(&self) -> Option<bool> {
        self.run.as_ref().and_then(|r| r.timing)
    }
}

fn join_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
