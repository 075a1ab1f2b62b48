//! Database schema initialization

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{RecordStore, SCHEMA_VERSION};

impl RecordStore {
    /// Initialize database schema
    pub(super) fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per materialized calculator collection
            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                calculator_type TEXT NOT NULL,
                fields TEXT NOT NULL,
                created TEXT NOT NULL,
                imported TEXT
            );

            -- Schemaless catalog rows; seq defines natural store order
            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection, seq);
            "#,
            )
            .into_diagnostic()?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .into_diagnostic()?;

        Ok(())
    }
}
