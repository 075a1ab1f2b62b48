//! `dcalc store` command - Record store maintenance
//!
//! The store is a local SQLite database holding every imported catalog row
//! as a JSON document, one collection per calculator type.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::output::emit;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// Show store statistics
    Status,

    /// Remove every record of one calculator type
    Clear {
        /// Calculator type to empty
        calculator_type: String,
    },
}

pub fn run(cmd: StoreCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StoreCommands::Status => run_status(global),
        StoreCommands::Clear { calculator_type } => run_clear(&calculator_type, global),
    }
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let stats = ws.store.statistics()?;

    match ws.format(global) {
        OutputFormat::Json | OutputFormat::Yaml => {
            let collections: Vec<serde_json::Value> = stats
                .collections
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "name": c.name,
                        "calculatorType": c.calculator_type,
                        "records": c.records,
                        "imported": c.imported,
                    })
                })
                .collect();
            let payload = serde_json::json!({
                "location": ws.config.store_path(&ws.project),
                "totalRecords": stats.total_records,
                "dbSizeBytes": stats.db_size_bytes,
                "collections": collections,
            });
            emit(&payload, ws.format(global))
        }
        OutputFormat::Tsv => {
            println!("COLLECTION\tTYPE\tRECORDS\tIMPORTED");
            for c in &stats.collections {
                println!(
                    "{}\t{}\t{}\t{}",
                    c.name,
                    c.calculator_type,
                    c.records,
                    c.imported.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        OutputFormat::Auto => {
            println!("{}", style("Store Status").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!(
                "  Location:        {}",
                ws.config.store_path(&ws.project).display()
            );
            println!("  Total records:   {}", style(stats.total_records).cyan());
            println!(
                "  Database size:   {} KB",
                style(stats.db_size_bytes / 1024).cyan()
            );

            if !stats.collections.is_empty() {
                println!();
                println!("  {}", style("By Collection:").bold());
                for c in &stats.collections {
                    println!(
                        "    {:<32} {:>7}  {}",
                        c.name,
                        c.records,
                        style(c.imported.as_deref().unwrap_or("never imported")).dim()
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_clear(calculator_type: &str, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let handle = ws.registry.resolve(&ws.store, calculator_type)?;
    let removed = ws.store.clear_collection(&handle.name)?;

    if !global.quiet {
        println!(
            "{} Removed {} record(s) from {}",
            style("✓").green(),
            style(removed).cyan(),
            style(&handle.name).cyan()
        );
    }
    Ok(())
}
