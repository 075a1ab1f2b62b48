//! `dcalc search` command - Calculator types mentioning some text
//!
//! Matches case-insensitive substrings of each type's searchable fields;
//! types without searchable fields never match.

use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::output::emit;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Text to look for (e.g. a brand or an item number)
    pub query: String,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let matches = ws.engine().search(&args.query)?;

    if args.count {
        println!("{}", matches.len());
        return Ok(());
    }

    match ws.format(global) {
        OutputFormat::Auto | OutputFormat::Tsv => {
            if matches.is_empty() {
                if !global.quiet {
                    println!("{}", style("No matching calculator types.").dim());
                }
                return Ok(());
            }
            for name in &matches {
                println!("{}", name);
            }
            Ok(())
        }
        format => emit(&matches, format),
    }
}
