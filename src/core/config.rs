//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::STORE_FILE;
use crate::core::Project;
use crate::engine::{EngineOptions, PriorityOrder, DEFAULT_BATCH_SIZE};

/// Environment variable overriding the store location
pub const ENV_STORE: &str = "DCALC_STORE";

/// Environment variable overriding the import batch size
pub const ENV_BATCH_SIZE: &str = "DCALC_BATCH_SIZE";

/// dcalc configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store database file; relative paths resolve against the project root
    pub store_path: Option<PathBuf>,

    /// Rows per import batch
    pub batch_size: Option<usize>,

    /// Accept answers naming fields outside a calculator's quiz
    pub lenient_answers: Option<bool>,

    /// Value prefixes listed first in quiz options
    pub priority_prefixes: Option<Vec<String>>,

    /// Default output format
    pub default_format: Option<String>,
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

impl Config {
    /// Load configuration from all sources, discovering the project from the
    /// current directory
    pub fn load() -> Result<Self, ConfigError> {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (accessors below)

        // 2. Global user config (~/.config/dcalc/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path)? {
                config.merge(global);
            }
        }

        // 3. Project config (.dcalc/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path())? {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.apply_env(|var| std::env::var(var).ok())?;

        Ok(config)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dcalc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Ok(None);
        };
        if contents.trim().is_empty() {
            return Ok(Some(Config::default()));
        }
        serde_yml::from_str::<Config>(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Apply environment overrides through `lookup`
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(store) = lookup(ENV_STORE).filter(|s| !s.trim().is_empty()) {
            self.store_path = Some(PathBuf::from(store));
        }
        if let Some(value) = lookup(ENV_BATCH_SIZE) {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.batch_size = Some(n),
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_BATCH_SIZE,
                        value,
                    })
                }
            }
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.store_path.is_some() {
            self.store_path = other.store_path;
        }
        if other.batch_size.is_some() {
            self.batch_size = other.batch_size;
        }
        if other.lenient_answers.is_some() {
            self.lenient_answers = other.lenient_answers;
        }
        if other.priority_prefixes.is_some() {
            self.priority_prefixes = other.priority_prefixes;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn lenient_answers(&self) -> bool {
        self.lenient_answers.unwrap_or(false)
    }

    pub fn priority(&self) -> PriorityOrder {
        match &self.priority_prefixes {
            Some(prefixes) => PriorityOrder::new(prefixes),
            None => PriorityOrder::default(),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            lenient_answers: self.lenient_answers(),
            priority: self.priority(),
        }
    }

    /// Store location for a project
    pub fn store_path(&self, project: &Project) -> PathBuf {
        match &self.store_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project.root().join(path),
            None => project.root().join(STORE_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_size(), 500);
        assert!(!config.lenient_answers());
        assert_eq!(config.priority(), PriorityOrder::default());
    }

    #[test]
    fn test_merge_later_wins() {
        let mut config = Config {
            batch_size: Some(100),
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        config.merge(Config {
            batch_size: Some(250),
            ..Default::default()
        });
        assert_eq!(config.batch_size(), 250);
        assert_eq!(config.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[(ENV_STORE, "/tmp/other.db"), (ENV_BATCH_SIZE, "42")]))
            .unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.batch_size(), 42);
    }

    #[test]
    fn test_env_batch_size_must_be_positive() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[(ENV_BATCH_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
        assert!(config.apply_env(env(&[(ENV_BATCH_SIZE, "many")])).is_err());
    }

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.config_path(),
            "lenient_answers: true\npriority_prefixes: [acme]\nstore_path: data/catalog.db\n",
        )
        .unwrap();

        let config = Config::read_file(&project.config_path()).unwrap().unwrap();
        assert!(config.lenient_answers());
        assert_eq!(config.priority(), PriorityOrder::new(["acme"]));
        assert_eq!(
            config.store_path(&project),
            project.root().join("data/catalog.db")
        );
    }

    #[test]
    fn test_invalid_config_file_is_reported() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "batch_size: [not, a, number]\n").unwrap();
        assert!(matches!(
            Config::read_file(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_default_store_path() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert_eq!(
            Config::default().store_path(&project),
            project.root().join(".dcalc/store.db")
        );
    }
}
