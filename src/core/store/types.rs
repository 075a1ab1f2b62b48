//! Store type definitions

use crate::core::calculator::CalculatorType;

/// Handle to one calculator type's record collection
///
/// Handles are created once per calculator type by the registry and shared
/// as `Arc<CollectionHandle>`; two handles for the same type are never
/// created within one registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    /// Collection name in the store
    pub name: String,
    /// Schema the collection was materialized with
    pub calculator: CalculatorType,
}

impl CollectionHandle {
    pub fn calculator_type(&self) -> &str {
        &self.calculator.id
    }

    /// Recognized quiz fields, in asking order
    pub fn fields(&self) -> &[String] {
        &self.calculator.fields
    }
}

/// Outcome of materializing a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Created,
    Existing,
}

/// Per-collection row counts
#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub name: String,
    pub calculator_type: String,
    pub records: usize,
    pub imported: Option<String>,
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub collections: Vec<CollectionStats>,
    pub total_records: usize,
    pub db_size_bytes: u64,
}
