//! `dcalc init` command - Initialize a new dcalc project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::calculator::CalculatorTable;
use crate::core::config::Config;
use crate::core::project::{Project, ProjectError};
use crate::core::registry::Registry;
use crate::core::store::RecordStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reset config and calculator table even if .dcalc/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let created = create_store(&project)?;
            println!(
                "{} Initialized dcalc project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!(
                "  {} calculator collection(s) ready",
                style(created).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Load a catalog export",
                style("dcalc import <TYPE> <CSV>").yellow()
            );
            println!(
                "  {} List calculator types",
                style("dcalc calc list").yellow()
            );
            println!(
                "  {} See what to ask next",
                style("dcalc next <TYPE> -a FIELD=VALUE").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} dcalc project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("dcalc init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

/// Open the store and materialize every calculator collection
fn create_store(project: &Project) -> Result<usize> {
    let config = Config::load_for(Some(project)).map_err(|e| miette::miette!("{}", e))?;
    let table = CalculatorTable::load(&project.calculators_path())
        .map_err(|e| miette::miette!("{}", e))?;

    let store = RecordStore::open(&config.store_path(project))?;
    let stats = Registry::new(table).warm_up(&store)?;
    Ok(stats.created + stats.existing)
}

fn print_structure(root: &Path) {
    let entries = [".dcalc/", ".dcalc/config.yaml", ".dcalc/calculators.yaml", ".dcalc/store.db"];

    for entry in entries {
        let full_path = root.join(entry);
        if full_path.exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
