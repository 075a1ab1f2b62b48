//! Payload rendering for the chosen output format
//!
//! Resolution payloads default to pretty JSON. TSV flattens an array of
//! scalars to one value per line and an array of objects to a header row
//! followed by one row per object.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Print a serializable payload
pub fn emit<T: Serialize>(payload: &T, format: OutputFormat) -> Result<()> {
    print!("{}", render(payload, format)?);
    Ok(())
}

pub fn render<T: Serialize>(payload: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Auto | OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(payload).into_diagnostic()?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => serde_yml::to_string(payload).into_diagnostic(),
        OutputFormat::Tsv => {
            let value = serde_json::to_value(payload).into_diagnostic()?;
            Ok(to_tsv(&value))
        }
    }
}

/// Text of a scalar for a TSV cell; tabs and newlines become spaces
pub fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\t', '\n', '\r'], " ")
}

fn to_tsv(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            let mut columns: Vec<&str> = Vec::new();
            for item in items.iter().filter_map(Value::as_object) {
                for key in item.keys() {
                    if !columns.contains(&key.as_str()) {
                        columns.push(key);
                    }
                }
            }
            out.push_str(&columns.join("\t"));
            out.push('\n');
            for item in items.iter().filter_map(Value::as_object) {
                let row: Vec<String> = columns
                    .iter()
                    .map(|c| item.get(*c).map(cell).unwrap_or_default())
                    .collect();
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
        }
        Value::Array(items) => {
            for item in items {
                out.push_str(&cell(item));
                out.push('\n');
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                out.push_str(&format!("{}\t{}\n", key, cell(value)));
            }
        }
        scalar => {
            out.push_str(&cell(scalar));
            out.push('\n');
        }
    }
    out
}
