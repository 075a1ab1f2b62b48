//! SQLite-backed record store
//!
//! This module provides the document store the engine queries:
//! - One `records` table holding every catalog row as a JSON document
//! - One `collections` row per materialized calculator type
//! - Exact-equality filtering via `json_extract` on bound parameters
//! - Case-insensitive substring search for the search capability
//!
//! Rows keep their insertion sequence, which is the natural store order
//! used wherever "first match" matters.

mod queries;
mod schema;
mod types;

pub use types::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::core::calculator::{CalculatorType, Record};
use crate::core::error::{EngineError, EngineResult};

/// Store file location within a project
pub const STORE_FILE: &str = ".dcalc/store.db";

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// The record store backed by SQLite
pub struct RecordStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }

        let conn = Connection::open(path).into_diagnostic()?;
        conn.busy_timeout(Duration::from_secs(5)).into_diagnostic()?;

        // Readers in other connections keep working during an import
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.check_schema_version()?;
        store.init_schema()?;
        store.register_functions().into_diagnostic()?;
        Ok(store)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().into_diagnostic()?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        store.register_functions().into_diagnostic()?;
        Ok(store)
    }

    /// Path of the database file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn check_schema_version(&self) -> Result<()> {
        let version: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()
            .ok()
            .flatten()
            .flatten();

        match version {
            Some(v) if v > SCHEMA_VERSION => Err(miette::miette!(
                "Store was written by a newer dcalc (schema v{}, this build reads v{})",
                v,
                SCHEMA_VERSION
            )),
            _ => Ok(()),
        }
    }

    /// Check-then-create the collection for a calculator type
    ///
    /// An existing collection always wins; the schema it was first created
    /// with is what the returned handle carries. A collection owned by a
    /// different calculator type is a `Validation` error. Creation uses
    /// `INSERT OR IGNORE`, so losing a race against another connection is
    /// reported as `Existing`, not as an error.
    pub fn materialize(
        &self,
        calculator: &CalculatorType,
    ) -> EngineResult<(CollectionHandle, Materialized)> {
        let name = calculator.collection_name();

        if let Some(handle) = self.existing_collection(name, calculator)? {
            return Ok((handle, Materialized::Existing));
        }

        let fields = serde_json::to_string(&calculator.fields)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO collections (name, calculator_type, fields, created) VALUES (?1, ?2, ?3, ?4)",
            params![name, calculator.id, fields, Utc::now().to_rfc3339()],
        )?;

        if inserted == 0 {
            if let Some(handle) = self.existing_collection(name, calculator)? {
                return Ok((handle, Materialized::Existing));
            }
        }

        debug!(collection = name, calculator_type = %calculator.id, "collection created");
        Ok((
            CollectionHandle {
                name: name.to_string(),
                calculator: calculator.clone(),
            },
            Materialized::Created,
        ))
    }

    fn existing_collection(
        &self,
        name: &str,
        calculator: &CalculatorType,
    ) -> EngineResult<Option<CollectionHandle>> {
        let stored: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT calculator_type, fields FROM collections WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((owner, fields)) = stored else {
            return Ok(None);
        };
        if owner != calculator.id {
            return Err(EngineError::validation(format!(
                "collection '{}' belongs to calculator type '{}', not '{}'",
                name, owner, calculator.id
            )));
        }

        let mut calculator = calculator.clone();
        calculator.fields = serde_json::from_str(&fields)?;
        Ok(Some(CollectionHandle {
            name: name.to_string(),
            calculator,
        }))
    }

    /// Remove every record of a collection, returning how many were removed
    pub fn clear_collection(&self, collection: &str) -> EngineResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1",
            params![collection],
        )?;
        Ok(removed)
    }

    /// Insert one batch of records atomically
    ///
    /// Either every row of the batch is stored or none is.
    pub fn insert_batch(&mut self, collection: &str, rows: &[Record]) -> EngineResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO records (collection, data) VALUES (?1, ?2)")?;
            for row in rows {
                let data = serde_json::to_string(row)?;
                stmt.execute(params![collection, data])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Record the time of the last completed import
    pub fn mark_imported(&self, collection: &str) -> EngineResult<()> {
        self.conn.execute(
            "UPDATE collections SET imported = ?1 WHERE name = ?2",
            params![Utc::now().to_rfc3339(), collection],
        )?;
        Ok(())
    }
}
