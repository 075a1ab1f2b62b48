//! `dcalc import` command - Replace a collection with a CSV export

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::cli::helpers::Workspace;
use crate::cli::output::emit;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::import::import_csv;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Calculator type whose records are replaced
    pub calculator_type: String,

    /// CSV file with a header row, or `-` for stdin
    pub file: PathBuf,

    /// Rows per insert batch (default: config `batch_size`, 500)
    #[arg(long)]
    pub batch_size: Option<usize>,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    let batch_size = args.batch_size.unwrap_or_else(|| ws.config.batch_size());

    let reader: Box<dyn Read> = if args.file.as_os_str() == "-" {
        Box::new(std::io::stdin())
    } else {
        let file = File::open(&args.file)
            .map_err(|e| miette::miette!("Cannot open {}: {}", args.file.display(), e))?;
        Box::new(BufReader::new(file))
    };

    let format = ws.format(global);
    let report = import_csv(
        &ws.registry,
        &mut ws.store,
        &args.calculator_type,
        reader,
        batch_size,
    )?;

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let summary = serde_json::json!({
                "collection": report.collection,
                "rowsRead": report.rows_read,
                "rowsInserted": report.rows_inserted,
                "rowsSkipped": report.rows_skipped,
                "replaced": report.replaced,
                "batches": report.batches.len(),
                "failedBatches": report.failed_batches(),
            });
            emit(&summary, format)
        }
        _ => {
            if global.quiet {
                return Ok(());
            }
            println!(
                "{} Imported {} into {}",
                style("✓").green(),
                style(format!("{} row(s)", report.rows_inserted)).cyan(),
                style(&report.collection).cyan()
            );
            println!("  Rows read:        {}", report.rows_read);
            println!("  Replaced:         {}", report.replaced);
            println!(
                "  Batches:          {} of up to {} row(s)",
                report.batches.len(),
                batch_size
            );
            if report.rows_skipped > 0 {
                println!("  Skipped rows:     {}", style(report.rows_skipped).yellow());
            }
            let failed = report.failed_batches();
            if failed > 0 {
                println!("  Failed batches:   {}", style(failed).red());
            }
            std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
            Ok(())
        }
    }
}
