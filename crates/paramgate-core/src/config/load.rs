//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::{ConfigurationError, Error, Result, UnpermittedPolicy};

/// Explicit config file replacing the project file
pub const CONFIG_ENV: &str = "PARAMGATE_CONFIG";

/// Default unpermitted policy override
pub const UNPERMITTED_ENV: &str = "PARAMGATE_UNPERMITTED";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Files a configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// Read when it exists
    pub global: Option<PathBuf>,
    /// Project or explicit file
    pub project: PathBuf,
    /// Whether a missing `project` file is an error (explicit files only)
    pub project_required: bool,
}

impl ConfigSources {
    /// Locate config files: an explicit path wins over `PARAMGATE_CONFIG`,
    /// which wins over `.paramgate/config.toml` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if the current directory cannot be determined.
    pub fn discover(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from));

        let (project, project_required) = match explicit {
            Some(path) => (path, true),
            None => (project_config_path()?, false),
        };

        Ok(Self {
            global: global_config_path(),
            project,
            project_required,
        })
    }

    /// Load and validate configuration from these sources.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - A config file is malformed TOML or cannot be read
    /// - An explicit config file does not exist
    /// - An environment override has an invalid value
    /// - A schema definition raises a `ConfigurationError`
    pub fn load(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        // 1. Start with built-in defaults
        let config = Config::default();

        // 2. Load global config if exists
        let config = match &self.global {
            Some(path) if path.exists() => config.merge(load_toml_file(path)?),
            _ => config,
        };

        // 3. Load project (or explicit) config
        let config = if self.project.exists() {
            config.merge(load_toml_file(&self.project)?)
        } else if self.project_required {
            return Err(Error::io_error(format!(
                "Config file not found: {}",
                self.project.display()
            )));
        } else {
            config
        };

        // 4. Apply environment variable overrides
        let config = config.apply_env_overrides(lookup)?;

        // 5. Validate every schema definition
        config.validate()?;

        debug!(
            schemas = config.schemas.len(),
            project = %self.project.display(),
            "loaded configuration"
        );
        Ok(config)
    }
}

/// Load configuration from all sources with hierarchy.
///
/// # Errors
///
/// See [`ConfigSources::load`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let env = |key: &str| std::env::var(key).ok();
    ConfigSources::discover(explicit, env)?.load(env)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "paramgate")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".paramgate/config.toml"))
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file into a partial Config
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<Config> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `PARAMGATE_*` overrides read through `lookup`
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable value is invalid
    pub fn apply_env_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(UNPERMITTED_ENV) {
            Some(value) => {
                let policy = value.parse::<UnpermittedPolicy>().map_err(|_| {
                    ConfigurationError::InvalidSetting {
                        key: UNPERMITTED_ENV.to_string(),
                        message: format!("expected ignore, log or reject, got '{value}'"),
                    }
                })?;
                Ok(self.with_unpermitted(Some(policy)))
            }
            None => Ok(self),
        }
    }
}
