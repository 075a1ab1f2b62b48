//! Calculator type definitions and the configuration table they are loaded from

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// A catalog row: field name to scalar value, in import column order
pub type Record = Map<String, Value>;

/// Quiz progress: field name to the single accepted value
pub type AnswerSet = Map<String, Value>;

#[derive(Embed)]
#[folder = "catalog/"]
struct CatalogAssets;

/// File name of the calculator table inside `.dcalc/`
pub const CALCULATORS_FILE: &str = "calculators.yaml";

/// A named category of configurable component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorType {
    /// Identifier used in requests (e.g. "DrillKitAndSequence")
    #[serde(rename = "type")]
    pub id: String,

    /// Collection holding the records; defaults to the identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Recognized quiz fields, in asking order
    #[serde(default)]
    pub fields: Vec<String>,

    /// Fields matched by free-text search
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub searchable: Vec<String>,
}

impl CalculatorType {
    pub fn new(id: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            id: id.into(),
            collection: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            searchable: Vec::new(),
        }
    }

    pub fn with_searchable(mut self, fields: &[&str]) -> Self {
        self.searchable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Name of the backing collection
    pub fn collection_name(&self) -> &str {
        self.collection.as_deref().unwrap_or(&self.id)
    }

    pub fn recognizes(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// Errors loading the calculator table
#[derive(Debug, Error)]
pub enum CalculatorTableError {
    #[error("Failed to read calculator table: {0}")]
    Io(String),

    #[error("Invalid calculator table: {0}")]
    Parse(String),

    #[error("Calculator type '{0}' is defined more than once")]
    Duplicate(String),

    #[error("Calculator types '{first}' and '{second}' both use collection '{collection}'")]
    SharedCollection {
        collection: String,
        first: String,
        second: String,
    },

    #[error("Embedded calculator table is missing")]
    MissingDefault,
}

/// The configuration table every registry is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorTable {
    #[serde(default)]
    pub calculators: Vec<CalculatorType>,
}

impl CalculatorTable {
    pub fn new(calculators: Vec<CalculatorType>) -> Result<Self, CalculatorTableError> {
        let table = Self { calculators };
        table.check_unique()?;
        Ok(table)
    }

    /// Raw YAML of the table shipped with the binary
    pub fn default_yaml() -> Result<String, CalculatorTableError> {
        let file =
            CatalogAssets::get(CALCULATORS_FILE).ok_or(CalculatorTableError::MissingDefault)?;
        Ok(String::from_utf8_lossy(&file.data).into_owned())
    }

    /// The table shipped with the binary
    pub fn builtin() -> Result<Self, CalculatorTableError> {
        Self::from_yaml(&Self::default_yaml()?)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, CalculatorTableError> {
        let table: CalculatorTable = serde_yml::from_str(contents)
            .map_err(|e| CalculatorTableError::Parse(e.to_string()))?;
        table.check_unique()?;
        Ok(table)
    }

    /// Load from a file, falling back to the built-in table if it does not exist
    pub fn load(path: &Path) -> Result<Self, CalculatorTableError> {
        if !path.exists() {
            return Self::builtin();
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| CalculatorTableError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    pub fn get(&self, id: &str) -> Option<&CalculatorType> {
        self.calculators.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalculatorType> {
        self.calculators.iter()
    }

    /// Identifiers and collection names must both be unique
    fn check_unique(&self) -> Result<(), CalculatorTableError> {
        for (i, calc) in self.calculators.iter().enumerate() {
            let earlier = &self.calculators[..i];
            if earlier.iter().any(|c| c.id == calc.id) {
                return Err(CalculatorTableError::Duplicate(calc.id.clone()));
            }
            if let Some(other) = earlier
                .iter()
                .find(|c| c.collection_name() == calc.collection_name())
            {
                return Err(CalculatorTableError::SharedCollection {
                    collection: calc.collection_name().to_string(),
                    first: other.id.clone(),
                    second: calc.id.clone(),
                });
            }
        }
        Ok(())
    }
}
