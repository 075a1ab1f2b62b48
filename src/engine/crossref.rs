//! Cross-reference resolver
//!
//! Answers gathered for one calculator type filter another type's
//! collection through the fields both schemas share. The canonical match is
//! the first candidate in natural store order that the output formatter
//! accepts; with no formatter for the output type, simply the first
//! candidate.

use serde::Serialize;
use tracing::debug;

use super::filter::Predicate;
use super::formatter::{FormattedOutput, OutputKind};
use crate::core::calculator::{AnswerSet, Record};
use crate::core::error::EngineResult;
use crate::core::store::{CollectionHandle, RecordStore};

/// Outcome of resolving answers against an output calculator type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossResolution {
    pub output_type: String,
    /// Fields carried over from the input answers
    pub shared_fields: Vec<String>,
    /// Every output record consistent with the carried-over answers
    pub candidates: Vec<Record>,
    /// Canonical record, `None` when no compatible record exists
    pub record: Option<Record>,
    /// `record` in parts-list form
    pub formatted: FormattedOutput,
}

impl CrossResolution {
    pub fn is_compatible(&self) -> bool {
        self.record.is_some()
    }
}

pub fn cross_resolve(
    store: &RecordStore,
    output: &CollectionHandle,
    input_answers: &AnswerSet,
) -> EngineResult<CrossResolution> {
    let predicate = Predicate::carried_over(&output.calculator, input_answers)?;
    let shared_fields: Vec<String> = predicate
        .clauses()
        .iter()
        .map(|c| c.field.clone())
        .collect();

    let candidates = store.find(&output.name, &predicate)?;
    let (record, formatted) = pick_canonical(output.calculator_type(), &candidates);

    debug!(
        output_type = output.calculator_type(),
        shared = shared_fields.len(),
        candidates = candidates.len(),
        compatible = record.is_some(),
        "cross-reference resolved"
    );

    Ok(CrossResolution {
        output_type: output.calculator_type().to_string(),
        shared_fields,
        candidates,
        record,
        formatted,
    })
}

/// First candidate the output formatter accepts, with its formatted form
pub fn pick_canonical(output_type: &str, candidates: &[Record]) -> (Option<Record>, FormattedOutput) {
    match OutputKind::from_tag(output_type) {
        Some(kind) => candidates
            .iter()
            .find(|c| kind.accepts(c))
            .map(|c| (Some(c.clone()), kind.format(c)))
            .unwrap_or((None, Vec::new())),
        None => (candidates.first().cloned(), Vec::new()),
    }
}
