//! `dcalc resolve` command - Full request/response resolution
//!
//! Takes either a JSON request (`--request FILE`, `-` for stdin) shaped like
//! `{"calculatorType", "quiz", "fields", "output"}`, or the same pieces as
//! flags.

use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;

use crate::cli::helpers::{parse_answers, Workspace};
use crate::cli::output::emit;
use crate::cli::GlobalOpts;
use crate::engine::ResolveRequest;

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Calculator type (omit when using --request)
    #[arg(required_unless_present = "request", conflicts_with = "request")]
    pub calculator_type: Option<String>,

    /// Read a JSON request from a file, or `-` for stdin
    #[arg(long, short = 'r', value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Answered quiz field, as FIELD=VALUE (repeatable)
    #[arg(long = "answer", short = 'a', value_name = "FIELD=VALUE", conflicts_with = "request")]
    pub answers: Vec<String>,

    /// Parse answer values as JSON scalars
    #[arg(long)]
    pub json_values: bool,

    /// Field to aggregate (repeatable)
    #[arg(long = "field", short = 'F', value_name = "FIELD", conflicts_with = "request")]
    pub fields: Vec<String>,

    /// Output calculator type to cross-reference into
    #[arg(long, short = 'o', conflicts_with = "request")]
    pub output: Option<String>,
}

pub fn run(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let request = build_request(&args)?;

    let ws = Workspace::open(global)?;
    let response = ws.engine().resolve(&request)?;
    emit(&response, ws.format(global))
}

fn build_request(args: &ResolveArgs) -> Result<ResolveRequest> {
    if let Some(path) = &args.request {
        let contents = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            buf
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))?
        };
        return serde_json::from_str(&contents)
            .map_err(|e| miette::miette!("Invalid resolve request: {}", e));
    }

    Ok(ResolveRequest {
        calculator_type: args.calculator_type.clone().unwrap_or_default(),
        quiz: parse_answers(&args.answers, args.json_values)?,
        fields: args.fields.clone(),
        output: args.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> ResolveArgs {
        ResolveArgs {
            calculator_type: Some("DrillKitAndSequence".to_string()),
            request: None,
            answers: vec!["Implant Brand=Neodent".to_string()],
            json_values: false,
            fields: vec!["Drill Kit Name".to_string()],
            output: Some("MasterImplantDriver".to_string()),
        }
    }

    #[test]
    fn test_request_from_flags() {
        let request = build_request(&args()).unwrap();
        assert_eq!(request.calculator_type, "DrillKitAndSequence");
        assert_eq!(request.quiz["Implant Brand"], json!("Neodent"));
        assert_eq!(request.fields, vec!["Drill Kit Name"]);
        assert_eq!(request.output.as_deref(), Some("MasterImplantDriver"));
    }

    #[test]
    fn test_request_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"type": "Implants", "quiz": {"Implant Brand": "Zimvie"}}"#,
        )
        .unwrap();

        let request = build_request(&ResolveArgs {
            calculator_type: None,
            request: Some(path),
            answers: Vec::new(),
            json_values: false,
            fields: Vec::new(),
            output: None,
        })
        .unwrap();
        assert_eq!(request.calculator_type, "Implants");
        assert!(request.fields.is_empty());
        assert!(request.output.is_none());
    }
}
