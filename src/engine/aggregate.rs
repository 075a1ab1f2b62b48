//! Unique result aggregation and option ordering
//!
//! Distinct values keep first-seen order unless a brand/material priority
//! applies to them, in which case prioritized values come first followed by
//! the rest in case-insensitive lexicographic order. Among prioritized
//! values a prefix later in the list outranks an earlier one.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::core::calculator::Record;

/// Prefixes that surface first, grouped as brands, shade guides, then materials
pub const DEFAULT_PRIORITY_PREFIXES: &[&str] = &[
    "straumann",
    "neodent",
    "zimvie",
    "nobel biocare",
    "dentsply sirona",
    "biohorizons",
    "ips e-max press ingot selection",
    "dentsply portrait ipn",
    "ivoclar blueline",
    "vita mft",
    "vita classic with bleached shades",
    "vita 3d master with bleached shades",
    "full metal",
    "resin",
    "pfm",
    "porcelain",
    "lithium disilicate",
    "zirconia",
];

/// Case-insensitive prefix priority used to order quiz options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOrder {
    prefixes: Vec<String>,
}

impl Default for PriorityOrder {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_PREFIXES.iter().copied())
    }
}

impl PriorityOrder {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Position of the first prefix the value starts with
    fn rank(&self, text: &str) -> Option<usize> {
        self.prefixes.iter().position(|p| text.starts_with(p.as_str()))
    }

    /// Whether any of the values is covered by a priority rule
    pub fn applies_to<'a>(&self, values: impl IntoIterator<Item = &'a Value>) -> bool {
        values
            .into_iter()
            .any(|v| self.rank(&sort_key(Some(v))).is_some())
    }

    /// Compare two values of one field
    ///
    /// The higher list position wins between two prioritized values.
    pub fn compare(&self, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let (ka, kb) = (sort_key(a), sort_key(b));
        match (self.rank(&ka), self.rank(&kb)) {
            (Some(x), Some(y)) if x != y => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            _ => ka.cmp(&kb),
        }
    }

    /// Compare records field by field; the first differing field decides
    pub fn compare_records(&self, a: &Record, b: &Record, fields: &[String]) -> Ordering {
        fields
            .iter()
            .map(|f| self.compare(a.get(f), b.get(f)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

fn sort_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().to_lowercase(),
    }
}

/// Deduplicated projection of a candidate set over requested fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniqueResult {
    /// One requested field: its distinct values
    Values(Vec<Value>),
    /// Several requested fields: distinct tuples as objects
    Tuples(Vec<Record>),
    /// No requested fields: distinct whole records
    Records(Vec<Record>),
}

impl UniqueResult {
    pub fn len(&self) -> usize {
        match self {
            UniqueResult::Values(v) => v.len(),
            UniqueResult::Tuples(t) | UniqueResult::Records(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate a candidate set according to how many fields were requested
pub fn aggregate(records: &[Record], fields: &[String], order: &PriorityOrder) -> UniqueResult {
    match fields {
        [] => UniqueResult::Records(unique_records(records)),
        [field] => UniqueResult::Values(unique_values(records, field, order)),
        _ => UniqueResult::Tuples(unique_tuples(records, fields, order)),
    }
}

/// Distinct values of one field; records lacking the field contribute nothing
pub fn unique_values(records: &[Record], field: &str, order: &PriorityOrder) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut values: Vec<Value> = records
        .iter()
        .filter_map(|r| r.get(field))
        .filter(|v| !v.is_null())
        .filter(|v| seen.insert(v.to_string()))
        .cloned()
        .collect();

    if order.applies_to(&values) {
        values.sort_by(|a, b| order.compare(Some(a), Some(b)));
    }
    values
}

/// Distinct tuples over several fields; missing fields become `null`
pub fn unique_tuples(records: &[Record], fields: &[String], order: &PriorityOrder) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut tuples: Vec<Record> = records
        .iter()
        .map(|r| {
            fields
                .iter()
                .map(|f| (f.clone(), r.get(f).cloned().unwrap_or(Value::Null)))
                .collect::<Record>()
        })
        .filter(|t| seen.insert(Value::Object(t.clone()).to_string()))
        .collect();

    if order.applies_to(tuples.iter().flat_map(|t| t.values())) {
        tuples.sort_by(|a, b| order.compare_records(a, b, fields));
    }
    tuples
}

/// Distinct whole records, first occurrence kept
pub fn unique_records(records: &[Record]) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(Value::Object((*r).clone()).to_string()))
        .cloned()
        .collect()
}
