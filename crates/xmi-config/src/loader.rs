//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{LibraryConfig, ProjectConfig, RunConfig, PROJECT_FILE};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.xmi/config.toml) - lowest priority
/// 2. Project config (./xmi.toml) - overrides global
/// 3. Environment variables (XMI_*) - overrides project
/// 4. Explicit options - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where xmi.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader reading global defaults from `path` instead of ~/.xmi
    pub fn with_global_config(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find xmi.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.xmi/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// - XMI_LIBRARY: library path
    /// - XMI_WORKING_DIRECTORY: kernel working directory
    /// - XMI_TIMING: "true"/"1"/"yes" or "false"/"0"/"no"
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(library) = env::var("XMI_LIBRARY") {
            config
                .library
                .get_or_insert_with(LibraryConfig::default)
                .path = Some(PathBuf::from(library));
        }

        if let Ok(dir) = env::var("XMI_WORKING_DIRECTORY") {
            config
                .run
                .get_or_insert_with(RunConfig::default)
                .working_directory = Some(PathBuf::from(dir));
        }

        if let Ok(timing) = env::var("XMI_TIMING") {
            let timing = match timing.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "XMI_TIMING".to_string(),
                        reason: format!("expected a boolean, got '{}'", other),
                    })
                }
            };
            config.run.get_or_insert_with(RunConfig::default).timing = Some(timing);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has xmi.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Configured library path, if any
    pub fn library_path(&self) -> Option<&Path> {
        self.project.library_path()
    }

    /// Configured library path, or an error naming the missing field
    pub fn require_library_path(&self) -> ConfigResult<&Path> {
        self.library_path().ok_or_else(|| ConfigError::MissingField {
            field: "library.path".to_string(),
        })
    }

    /// Dependency directories: project entries first, then global defaults
    pub fn dependency_dirs(&self) -> Vec<PathBuf> {
        self.project
            .dependencies()
            .iter()
            .chain(self.global.default_dependencies())
            .cloned()
            .collect()
    }

    /// Working directory the kernel should run in
    pub fn working_directory(&self) -> Option<&Path> {
        self.project.working_directory()
    }

    /// Effective timing flag (project > global > off)
    pub fn timing(&self) -> bool {
        self.project
            .timing()
            .or_else(|| self.global.default_timing())
            .unwrap_or(false)
    }
}
