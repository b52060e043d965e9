use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::engine::EngineConfig;
use super::errors::ConfigError;
use super::hooks::HookConfig;
use super::logging::LoggingConfig;

/// Main configuration structure for Ferrous Hooks
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Runtime pool, timeouts and sandbox limits
    #[serde(default)]
    pub engine: EngineConfig,

    /// Script hooks, in execution order
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-hooks.toml in current directory
    /// 3. /etc/ferrous-hooks/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-hooks.toml").exists() {
            Self::from_file("ferrous-hooks.toml")?
        } else if std::path::Path::new("/etc/ferrous-hooks/config.toml").exists() {
            Self::from_file("/etc/ferrous-hooks/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(size) = overrides.pool_size {
            self.engine.pool_size = size;
        }
        if let Some(ms) = overrides.fetch_timeout_ms {
            self.engine.fetch_timeout_ms = ms;
        }
    }

    pub fn enabled_hooks(&self) -> impl Iterator<Item = &HookConfig> {
        self.hooks.iter().filter(|h| h.enabled)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;

        if engine.pool_size == 0 {
            return Err(ConfigError::Validation(
                "engine.pool_size must be at least 1".to_string(),
            ));
        }

        for (field, value) in [
            ("acquire_timeout_ms", engine.acquire_timeout_ms),
            ("fetch_timeout_ms", engine.fetch_timeout_ms),
            ("execution_timeout_ms", engine.execution_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "engine.{} must be greater than 0",
                    field
                )));
            }
        }

        let mut names = HashSet::new();
        for hook in &self.hooks {
            if hook.name.trim().is_empty() {
                return Err(ConfigError::Validation("Hook with empty name".to_string()));
            }
            if !names.insert(hook.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate hook name '{}'",
                    hook.name
                )));
            }
            if hook.script.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Hook '{}' has no script",
                    hook.name
                )));
            }
        }

        Ok(())
    }

    /// Startup check: every enabled hook's entry script must exist.
    pub fn check_scripts_exist(&self) -> Result<(), ConfigError> {
        for hook in self.enabled_hooks() {
            if !hook.script.is_file() {
                return Err(ConfigError::MissingScript {
                    hook: hook.name.clone(),
                    path: hook.script.display().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub pool_size: Option<usize>,
    pub fetch_timeout_ms: Option<u64>,
}
