//! Quiz-driven compatibility resolution
//!
//! `Engine` ties the registry, the record store and the pure pieces in this
//! module together. Every call computes its answer fresh from the store;
//! nothing about a quiz is remembered between calls.

pub mod aggregate;
pub mod crossref;
pub mod discriminator;
pub mod filter;
pub mod formatter;
pub mod import;

pub use aggregate::{PriorityOrder, UniqueResult};
pub use crossref::CrossResolution;
pub use discriminator::FieldOptions;
pub use filter::Predicate;
pub use formatter::{FormattedOutput, OutputGroup, OutputItem, OutputKind};
pub use import::{ImportReport, RecordSink, DEFAULT_BATCH_SIZE};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::calculator::{AnswerSet, Record};
use crate::core::error::{EngineError, EngineResult};
use crate::core::registry::{Registry, WarmUpStats};
use crate::core::store::{CollectionHandle, RecordStore};

/// Behavior switches taken from configuration
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Let answers name fields outside the calculator's quiz schema
    pub lenient_answers: bool,
    pub priority: PriorityOrder,
}

/// A resolution request as accepted from callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    #[serde(alias = "type")]
    pub calculator_type: String,
    #[serde(default)]
    pub quiz: AnswerSet,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A resolution response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub result: UniqueResult,
    /// Present only when an output type was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_response: Option<FormattedOutput>,
}

pub struct Engine<'a> {
    registry: &'a Registry,
    store: &'a RecordStore,
    options: EngineOptions,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry, store: &'a RecordStore) -> Self {
        Self::with_options(registry, store, EngineOptions::default())
    }

    pub fn with_options(
        registry: &'a Registry,
        store: &'a RecordStore,
        options: EngineOptions,
    ) -> Self {
        Self {
            registry,
            store,
            options,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Materialize every configured calculator type
    pub fn warm_up(&self) -> EngineResult<WarmUpStats> {
        self.registry.warm_up(self.store)
    }

    fn handle(&self, calculator_type: &str) -> EngineResult<Arc<CollectionHandle>> {
        if calculator_type.trim().is_empty() {
            return Err(EngineError::validation("calculator type is required"));
        }
        self.registry.resolve(self.store, calculator_type)
    }

    /// Records of a calculator type consistent with the answers
    pub fn candidates(&self, calculator_type: &str, answers: &AnswerSet) -> EngineResult<Vec<Record>> {
        let handle = self.handle(calculator_type)?;
        let predicate =
            Predicate::for_calculator(&handle.calculator, answers, self.options.lenient_answers)?;
        self.store.find(&handle.name, &predicate)
    }

    /// Distinct values, tuples or records over `fields` among the candidates
    pub fn options(
        &self,
        calculator_type: &str,
        answers: &AnswerSet,
        fields: &[String],
    ) -> EngineResult<UniqueResult> {
        check_requested_fields(fields)?;
        let candidates = self.candidates(calculator_type, answers)?;
        Ok(aggregate::aggregate(&candidates, fields, &self.options.priority))
    }

    /// Fields still to be asked, with the values each can still take
    pub fn next_fields(
        &self,
        calculator_type: &str,
        answers: &AnswerSet,
    ) -> EngineResult<Vec<FieldOptions>> {
        let handle = self.handle(calculator_type)?;
        let predicate =
            Predicate::for_calculator(&handle.calculator, answers, self.options.lenient_answers)?;
        let candidates = self.store.find(&handle.name, &predicate)?;
        Ok(discriminator::next_fields(
            handle.fields(),
            answers,
            &candidates,
            &self.options.priority,
        ))
    }

    /// Carry answers over into another calculator type's collection
    pub fn cross_resolve(
        &self,
        input_answers: &AnswerSet,
        output_type: &str,
    ) -> EngineResult<CrossResolution> {
        let output = self.handle(output_type)?;
        crossref::cross_resolve(self.store, &output, input_answers)
    }

    /// Answer a full request
    ///
    /// An empty `output` counts as no output.
    pub fn resolve(&self, request: &ResolveRequest) -> EngineResult<ResolveResponse> {
        let result = self.options(&request.calculator_type, &request.quiz, &request.fields)?;

        let quiz_response = match request.output.as_deref().map(str::trim) {
            Some(output) if !output.is_empty() => {
                let resolution = self.cross_resolve(&request.quiz, output)?;
                Some(resolution.formatted)
            }
            _ => None,
        };

        debug!(
            calculator_type = %request.calculator_type,
            results = result.len(),
            output = request.output.as_deref().unwrap_or(""),
            "request resolved"
        );
        Ok(ResolveResponse {
            result,
            quiz_response,
        })
    }

    /// The single record matching the answers
    pub fn lookup(&self, calculator_type: &str, answers: &AnswerSet) -> EngineResult<Record> {
        let mut candidates = self.candidates(calculator_type, answers)?;
        match candidates.len() {
            0 => Err(EngineError::not_found(format!(
                "no {} record matches the given answers",
                calculator_type
            ))),
            1 => Ok(candidates.remove(0)),
            count => Err(EngineError::AmbiguousMatch {
                calculator_type: calculator_type.to_string(),
                count,
            }),
        }
    }

    /// Calculator types whose searchable fields contain `text`, in table order
    pub fn search(&self, text: &str) -> EngineResult<Vec<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::validation("search text is required"));
        }

        let mut matches = Vec::new();
        for calculator in self.registry.table().iter() {
            if calculator.searchable.is_empty() {
                continue;
            }
            let handle = self.registry.resolve(self.store, &calculator.id)?;
            if self
                .store
                .contains_text(&handle.name, &calculator.searchable, text)?
            {
                matches.push(calculator.id.clone());
            }
        }
        Ok(matches)
    }
}

fn check_requested_fields(fields: &[String]) -> EngineResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(EngineError::validation("requested field names must not be empty"));
    }
    Ok(())
}
