//! Query methods for retrieving records
//!
//! Filtered reads in natural store order, counts, substring search and
//! statistics.

use rusqlite::functions::FunctionFlags;
use rusqlite::params;
use tracing::debug;

use super::{CollectionStats, RecordStore, StoreStats};
use crate::core::calculator::Record;
use crate::core::error::EngineResult;
use crate::engine::filter::{json_path, Predicate};

/// SQL name of the Unicode lowercase function used by text search
const FOLD_FN: &str = "dcalc_fold";

impl RecordStore {
    /// Register Rust-side SQL functions on the connection
    ///
    /// SQLite's own `LOWER()` and `LIKE` only fold ASCII, so search folds
    /// the stored text with the same `to_lowercase` applied to the pattern.
    pub(super) fn register_functions(&self) -> rusqlite::Result<()> {
        self.conn.create_scalar_function(
            FOLD_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )
    }

    /// All records of a collection satisfying the predicate, in natural store order
    pub fn find(&self, collection: &str, predicate: &Predicate) -> EngineResult<Vec<Record>> {
        let (conditions, filter_params) = predicate.to_sql(2);
        let sql = format!(
            "SELECT data FROM records WHERE collection = ?1{} ORDER BY seq",
            conditions
        );

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(collection.to_string())];
        params_vec.extend(filter_params);
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let data = row?;
            records.push(serde_json::from_str::<Record>(&data)?);
        }

        debug!(
            collection,
            clauses = predicate.clauses().len(),
            matched = records.len(),
            "records fetched"
        );
        Ok(records)
    }

    /// Number of records in a collection
    pub fn count(&self, collection: &str) -> EngineResult<usize> {
        let count: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Whether any record has one of `fields` containing `text`, ignoring case
    ///
    /// `%`, `_` and `\` in the text match themselves. An empty field list
    /// never matches.
    pub fn contains_text(&self, collection: &str, fields: &[String], text: &str) -> EngineResult<bool> {
        if fields.is_empty() {
            return Ok(false);
        }

        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(collection.to_string()),
            Box::new(pattern),
        ];

        let mut ors = Vec::with_capacity(fields.len());
        for field in fields {
            ors.push(format!(
                "{}(CAST(json_extract(data, ?{}) AS TEXT)) LIKE ?2 ESCAPE '\\'",
                FOLD_FN,
                params_vec.len() + 1
            ));
            params_vec.push(Box::new(json_path(field)));
        }

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM records WHERE collection = ?1 AND ({}))",
            ors.join(" OR ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let found: bool = self
            .conn
            .query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(found)
    }

    /// Get store statistics
    pub fn statistics(&self) -> EngineResult<StoreStats> {
        let mut stmt = self.conn.prepare(
            r#"SELECT c.name, c.calculator_type, c.imported,
                      (SELECT COUNT(*) FROM records r WHERE r.collection = c.name)
               FROM collections c
               ORDER BY c.name"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CollectionStats {
                name: row.get(0)?,
                calculator_type: row.get(1)?,
                imported: row.get(2)?,
                records: row.get(3)?,
            })
        })?;

        let mut collections = Vec::new();
        for row in rows {
            collections.push(row?);
        }

        let total_records: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;

        let db_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            collections,
            total_records,
            db_size_bytes,
        })
    }
}

/// Escape LIKE wildcards so the text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
