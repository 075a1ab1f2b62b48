//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcCommands,
    import::ImportArgs,
    init::InitArgs,
    lookup::LookupArgs,
    next::NextArgs,
    options::OptionsArgs,
    resolve::ResolveArgs,
    search::SearchArgs,
    store::StoreCommands,
};

#[derive(Parser)]
#[command(name = "dcalc")]
#[command(author, version, about = "Dental parts compatibility calculator")]
#[command(long_about = "Answer quiz questions about a dental component to narrow a parts catalog, then resolve the compatible drivers, screws and kits.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (info-level logs on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .dcalc/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new dcalc project
    Init(InitArgs),

    /// Calculator type management
    #[command(subcommand)]
    Calc(CalcCommands),

    /// Distinct values of requested fields among matching records
    Options(OptionsArgs),

    /// Quiz fields still to be answered, with their remaining values
    Next(NextArgs),

    /// Resolve a full request, optionally cross-referencing an output type
    Resolve(ResolveArgs),

    /// Fetch the single record matching the answers
    Lookup(LookupArgs),

    /// Find calculator types whose catalog mentions some text
    Search(SearchArgs),

    /// Replace a calculator type's records with a CSV export
    Import(ImportArgs),

    /// Record store maintenance
    #[command(subcommand)]
    Store(StoreCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (json for payloads, table for listings)
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
}

impl OutputFormat {
    /// Apply a configured default when the flag was left on `auto`
    pub fn or_configured(self, configured: Option<&str>) -> Self {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}
