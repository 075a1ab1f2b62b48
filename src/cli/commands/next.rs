//! `dcalc next` command - Quiz fields still open and their values

use console::style;
use miette::Result;

use crate::cli::commands::QuizArgs;
use crate::cli::helpers::Workspace;
use crate::cli::output::{cell, emit};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    #[command(flatten)]
    pub quiz: QuizArgs,
}

pub fn run(args: NextArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let answers = args.quiz.answer_set()?;

    let next = ws
        .engine()
        .next_fields(&args.quiz.calculator_type, &answers)?;

    match ws.format(global) {
        OutputFormat::Auto => {
            if next.is_empty() {
                if !global.quiet {
                    println!("{} Every quiz field is answered", style("✓").green());
                }
                return Ok(());
            }
            for options in &next {
                println!("{}", style(&options.field).bold());
                if options.values.is_empty() {
                    println!("  {}", style("(no matching records)").dim());
                }
                for value in &options.values {
                    println!("  {}", cell(value));
                }
            }
            Ok(())
        }
        OutputFormat::Tsv => {
            for options in &next {
                for value in &options.values {
                    println!("{}\t{}", options.field, cell(value));
                }
            }
            Ok(())
        }
        format => emit(&next, format),
    }
}
