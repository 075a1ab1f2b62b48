//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::calculator::{CalculatorTable, CALCULATORS_FILE};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".dcalc";

/// Represents a dcalc project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .dcalc/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_structure(root)
    }

    /// Initialize even if .dcalc/ exists, resetting config and calculator table
    ///
    /// The store is left in place.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root)
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.dcalc_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let calculators =
            CalculatorTable::default_yaml().map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.calculators_path(), calculators)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# dcalc project configuration

# Store database (relative to the project root); DCALC_STORE overrides
# store_path: .dcalc/store.db

# Rows per import batch; DCALC_BATCH_SIZE overrides
# batch_size: 500

# Accept answers naming fields a calculator does not ask about
# lenient_answers: false

# Option values starting with these prefixes are listed first, in this order
# priority_prefixes: [straumann, neodent, zimvie]

# Default output format (auto, json, yaml, tsv)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .dcalc configuration directory
    pub fn dcalc_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dcalc_dir().join("config.yaml")
    }

    /// The calculator table every registry of this project is built from
    pub fn calculators_path(&self) -> PathBuf {
        self.dcalc_dir().join(CALCULATORS_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a dcalc project (searched from {searched_from:?}). Run 'dcalc init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("dcalc project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
