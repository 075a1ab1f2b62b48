//! Calculator type registry
//!
//! Maps calculator-type identifiers to collection handles. The registry is
//! built from a `CalculatorTable` and injected wherever it is needed; it
//! holds the only shared mutable state of the engine, a handle cache behind
//! an `RwLock`.
//!
//! Creation is check-then-create under the write lock: the cache is checked
//! again after the lock is taken, so concurrent first calls for one type all
//! receive the same `Arc<CollectionHandle>`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::core::calculator::{CalculatorTable, CalculatorType};
use crate::core::error::{EngineError, EngineResult};
use crate::core::store::{CollectionHandle, Materialized, RecordStore};

/// Result of materializing every configured type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmUpStats {
    pub created: usize,
    pub existing: usize,
}

pub struct Registry {
    table: CalculatorTable,
    handles: RwLock<HashMap<String, Arc<CollectionHandle>>>,
}

impl Registry {
    pub fn new(table: CalculatorTable) -> Self {
        Self {
            table,
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn table(&self) -> &CalculatorTable {
        &self.table
    }

    /// Configured calculator type, or `NotFound`
    pub fn calculator(&self, id: &str) -> EngineResult<&CalculatorType> {
        self.table
            .get(id)
            .ok_or_else(|| EngineError::not_found(format!("{} data does not exist", id)))
    }

    /// Handle already materialized by this registry, if any
    pub fn cached(&self, id: &str) -> Option<Arc<CollectionHandle>> {
        self.handles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Get the handle for a calculator type, creating its collection on first use
    pub fn resolve(&self, store: &RecordStore, id: &str) -> EngineResult<Arc<CollectionHandle>> {
        if let Some(handle) = self.cached(id) {
            return Ok(handle);
        }

        let calculator = self.calculator(id)?;

        let mut handles = self.handles.write().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = handles.get(id) {
            return Ok(Arc::clone(handle));
        }

        let (handle, outcome) = store.materialize(calculator)?;
        debug!(calculator_type = id, ?outcome, "collection handle cached");

        let handle = Arc::new(handle);
        handles.insert(id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Materialize every configured calculator type
    pub fn warm_up(&self, store: &RecordStore) -> EngineResult<WarmUpStats> {
        let mut stats = WarmUpStats::default();
        let mut handles = self.handles.write().unwrap_or_else(|e| e.into_inner());

        for calculator in self.table.iter() {
            if handles.contains_key(&calculator.id) {
                stats.existing += 1;
                continue;
            }
            let (handle, outcome) = store.materialize(calculator)?;
            match outcome {
                Materialized::Created => stats.created += 1,
                Materialized::Existing => stats.existing += 1,
            }
            handles.insert(calculator.id.clone(), Arc::new(handle));
        }

        info!(
            created = stats.created,
            existing = stats.existing,
            "calculator collections initialized"
        );
        Ok(stats)
    }
}
