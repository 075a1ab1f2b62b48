//! Field discriminator
//!
//! Given the records still consistent with the answers so far, lists every
//! quiz field not yet answered together with the values it can still take.

use serde::Serialize;
use serde_json::Value;

use super::aggregate::{unique_values, PriorityOrder};
use crate::core::calculator::{AnswerSet, Record};

/// Remaining choices for one unanswered quiz field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOptions {
    pub field: String,
    pub values: Vec<Value>,
}

/// Unanswered schema fields, in schema order, with their distinct values
pub fn next_fields(
    schema: &[String],
    answers: &AnswerSet,
    candidates: &[Record],
    order: &PriorityOrder,
) -> Vec<FieldOptions> {
    schema
        .iter()
        .filter(|field| !answers.contains_key(field.as_str()))
        .map(|field| FieldOptions {
            field: field.clone(),
            values: unique_values(candidates, field, order),
        })
        .collect()
}
