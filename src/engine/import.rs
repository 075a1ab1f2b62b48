//! Bulk import boundary
//!
//! Replaces a whole collection with the rows of a spreadsheet export:
//! the collection is emptied first, then rows are inserted in fixed-size
//! batches. A batch that fails to insert counts as zero rows and the
//! import moves on to the next batch.

use std::io::Read;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::core::calculator::Record;
use crate::core::error::{EngineError, EngineResult};
use crate::core::registry::Registry;
use crate::core::store::RecordStore;

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Destination of an import
pub trait RecordSink {
    /// Remove every existing record of the collection
    fn replace(&mut self, collection: &str) -> EngineResult<usize>;

    /// Insert one batch; all rows or none
    fn insert_batch(&mut self, collection: &str, rows: &[Record]) -> EngineResult<usize>;

    /// Called once after the last batch
    fn finish(&mut self, _collection: &str) -> EngineResult<()> {
        Ok(())
    }
}

impl RecordSink for RecordStore {
    fn replace(&mut self, collection: &str) -> EngineResult<usize> {
        self.clear_collection(collection)
    }

    fn insert_batch(&mut self, collection: &str, rows: &[Record]) -> EngineResult<usize> {
        RecordStore::insert_batch(self, collection, rows)
    }

    fn finish(&mut self, collection: &str) -> EngineResult<()> {
        self.mark_imported(collection)
    }
}

/// What happened to one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub rows: usize,
    pub inserted: usize,
}

impl BatchOutcome {
    pub fn failed(&self) -> bool {
        self.inserted == 0 && self.rows > 0
    }
}

/// Import summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub collection: String,
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub replaced: usize,
    pub batches: Vec<BatchOutcome>,
}

impl ImportReport {
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| b.failed()).count()
    }
}

/// Turn a header row and one data row into a record
///
/// Field names are trimmed; columns with an empty header and empty cells
/// are left out so that absent values stay absent.
pub fn row_to_record(header: &[String], row: &[String]) -> Record {
    header
        .iter()
        .zip(row.iter())
        .filter(|(name, cell)| !name.is_empty() && !cell.trim().is_empty())
        .map(|(name, cell)| (name.clone(), serde_json::Value::String(cell.clone())))
        .collect()
}

/// Replace `collection` with `rows`, inserting `batch_size` rows at a time
pub fn import_rows<S, I>(
    sink: &mut S,
    collection: &str,
    header: &[String],
    rows: I,
    batch_size: usize,
) -> EngineResult<ImportReport>
where
    S: RecordSink,
    I: IntoIterator<Item = Vec<String>>,
{
    if batch_size == 0 {
        return Err(EngineError::validation("batch size must be at least 1"));
    }

    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let mut report = ImportReport {
        collection: collection.to_string(),
        replaced: sink.replace(collection)?,
        ..Default::default()
    };

    let mut batch = Vec::with_capacity(batch_size);
    for row in rows {
        report.rows_read += 1;
        batch.push(row_to_record(&header, &row));
        if batch.len() == batch_size {
            flush(sink, collection, &mut batch, &mut report);
        }
    }
    if !batch.is_empty() {
        flush(sink, collection, &mut batch, &mut report);
    }

    sink.finish(collection)?;

    info!(
        collection,
        rows = report.rows_inserted,
        batches = report.batches.len(),
        failed_batches = report.failed_batches(),
        "import complete"
    );
    Ok(report)
}

fn flush<S: RecordSink>(
    sink: &mut S,
    collection: &str,
    batch: &mut Vec<Record>,
    report: &mut ImportReport,
) {
    let index = report.batches.len() + 1;
    let inserted = match sink.insert_batch(collection, batch) {
        Ok(n) => {
            debug!(collection, batch = index, rows = n, "batch inserted");
            n
        }
        Err(err) => {
            warn!(collection, batch = index, rows = batch.len(), error = ?err, "batch insert failed");
            0
        }
    };
    report.batches.push(BatchOutcome {
        rows: batch.len(),
        inserted,
    });
    report.rows_inserted += inserted;
    batch.clear();
}

/// Import CSV data into a calculator type's collection
///
/// Rows that cannot be parsed are skipped and counted; a header missing
/// one of the type's quiz fields only produces a warning.
pub fn import_csv<R: Read>(
    registry: &Registry,
    store: &mut RecordStore,
    calculator_type: &str,
    reader: R,
    batch_size: usize,
) -> EngineResult<ImportReport> {
    let handle = registry.resolve(store, calculator_type)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| EngineError::validation(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if header.iter().all(|h| h.is_empty()) {
        return Err(EngineError::validation("CSV header row is empty"));
    }

    for field in handle.fields() {
        if !header.contains(field) {
            warn!(calculator_type, field = %field, "quiz field missing from import header");
        }
    }

    let mut skipped = 0;
    let rows = rdr.records().enumerate().filter_map(|(idx, result)| match result {
        Ok(record) => Some(record.iter().map(String::from).collect::<Vec<String>>()),
        Err(err) => {
            warn!(row = idx + 2, error = %err, "skipping unparsable CSV row");
            skipped += 1;
            None
        }
    });

    let mut report = import_rows(store, &handle.name, &header, rows, batch_size)?;
    report.rows_skipped = skipped;
    Ok(report)
}
