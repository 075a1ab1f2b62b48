//! `dcalc calc` command - Calculator type listing

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{truncate_str, Workspace};
use crate::cli::output::emit;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum CalcCommands {
    /// List configured calculator types with their quiz fields
    List {
        /// Show full field lists instead of truncating
        #[arg(long)]
        full: bool,
    },
}

/// One listed calculator type
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalcRow {
    #[serde(rename = "type")]
    id: String,
    collection: String,
    fields: Vec<String>,
    searchable: Vec<String>,
    records: usize,
}

pub fn run(cmd: CalcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CalcCommands::List { full } => run_list(full, global),
    }
}

fn run_list(full: bool, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut rows = Vec::new();
    for calculator in ws.registry.table().iter() {
        let handle = ws.registry.resolve(&ws.store, &calculator.id)?;
        rows.push(CalcRow {
            id: calculator.id.clone(),
            collection: handle.name.clone(),
            fields: handle.fields().to_vec(),
            searchable: calculator.searchable.clone(),
            records: ws.store.count(&handle.name)?,
        });
    }

    match ws.format(global) {
        OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(["TYPE", "COLLECTION", "RECORDS", "QUIZ FIELDS"]);
            for row in &rows {
                let fields = row.fields.join(", ");
                let fields = if full { fields } else { truncate_str(&fields, 60) };
                builder.push_record([
                    row.id.clone(),
                    row.collection.clone(),
                    row.records.to_string(),
                    fields,
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));

            if !global.quiet {
                let total: usize = rows.iter().map(|r| r.records).sum();
                println!(
                    "{} calculator type(s), {} record(s)",
                    style(rows.len()).cyan(),
                    style(total).cyan()
                );
            }
            Ok(())
        }
        OutputFormat::Tsv => {
            println!("TYPE\tCOLLECTION\tRECORDS\tFIELDS");
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.id,
                    row.collection,
                    row.records,
                    row.fields.join(",")
                );
            }
            Ok(())
        }
        format => emit(&rows, format),
    }
}
