//! Constraint filter builder
//!
//! Turns an answer set into a conjunction of exact-equality clauses that run
//! in the store as SQL over `json_extract`. Strings compare byte-for-byte,
//! numbers compare by numeric value, and a string never equals a number.
//! Tests check the SQL against an in-memory evaluation of the same rules.

use rusqlite::ToSql;
use serde_json::Value;

use crate::core::calculator::{AnswerSet, CalculatorType};
#[cfg(test)]
use crate::core::calculator::Record;
use crate::core::error::{EngineError, EngineResult};

/// One `field == value` constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub value: Value,
}

/// Conjunction of equality clauses; no clauses matches every record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The predicate every record satisfies
    pub fn universal() -> Self {
        Self::default()
    }

    /// Build a predicate from every answer, without consulting a schema
    pub fn build(answers: &AnswerSet) -> EngineResult<Self> {
        let mut clauses = Vec::with_capacity(answers.len());
        for (field, value) in answers {
            check_field_name(field)?;
            check_scalar(field, value)?;
            clauses.push(Clause {
                field: field.clone(),
                value: value.clone(),
            });
        }
        Ok(Self { clauses })
    }

    /// Build a predicate for a calculator type
    ///
    /// Answers naming a field outside the type's schema are rejected unless
    /// `lenient` is set, in which case they still become constraints.
    pub fn for_calculator(
        calculator: &CalculatorType,
        answers: &AnswerSet,
        lenient: bool,
    ) -> EngineResult<Self> {
        if !lenient {
            let unknown: Vec<&str> = answers
                .keys()
                .filter(|field| !calculator.recognizes(field))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(EngineError::validation(format!(
                    "{} does not ask about: {}",
                    calculator.id,
                    unknown.join(", ")
                )));
            }
        }
        Self::build(answers)
    }

    /// Constraints carried from answers collected for another calculator type
    ///
    /// Only answers naming a field of `calculator`'s schema survive; with no
    /// shared fields the result is the universal predicate.
    pub fn carried_over(calculator: &CalculatorType, answers: &AnswerSet) -> EngineResult<Self> {
        let shared: AnswerSet = calculator
            .fields
            .iter()
            .filter_map(|field| answers.get(field).map(|v| (field.clone(), v.clone())))
            .collect();
        Self::build(&shared)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate against a record in memory
    #[cfg(test)]
    pub(crate) fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| {
            record
                .get(&clause.field)
                .is_some_and(|actual| scalar_eq(actual, &clause.value))
        })
    }

    /// Render as SQL conditions over the `data` column
    ///
    /// Returns a fragment starting with ` AND ` per clause (empty for the
    /// universal predicate) and the parameters it binds, numbered from
    /// `first_param`.
    pub(crate) fn to_sql(&self, first_param: usize) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::with_capacity(self.clauses.len() * 2);

        for clause in &self.clauses {
            let n = first_param + params.len();
            sql.push_str(&format!(" AND json_extract(data, ?{}) = ?{}", n, n + 1));
            params.push(Box::new(json_path(&clause.field)));
            params.push(sql_value(&clause.value));
        }

        (sql, params)
    }
}

/// JSON path addressing a top-level field, quoted so spaces and dots are literal
pub(crate) fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field)
}

fn check_field_name(field: &str) -> EngineResult<()> {
    if field.trim().is_empty() {
        return Err(EngineError::validation("quiz field names must not be empty"));
    }
    if field.contains('"') {
        return Err(EngineError::validation(format!(
            "quiz field name must not contain '\"': {}",
            field
        )));
    }
    Ok(())
}

fn check_scalar(field: &str, value: &Value) -> EngineResult<()> {
    match value {
        Value::String(_) | Value::Number(_) => Ok(()),
        other => Err(EngineError::validation(format!(
            "answer for '{}' must be a string or number, got {}",
            field, other
        ))),
    }
}

fn sql_value(value: &Value) -> Box<dyn ToSql> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Box::new(i),
            None => Box::new(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Box::new(s.clone()),
        other => Box::new(other.to_string()),
    }
}

#[cfg(test)]
fn scalar_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        (a, b) => a == b,
    }
}
