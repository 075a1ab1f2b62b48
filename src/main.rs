use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use dcalc::cli::{Cli, Commands, GlobalOpts};

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "DCALC_LOG";

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => dcalc::cli::commands::init::run(args),
        Commands::Calc(cmd) => dcalc::cli::commands::calc::run(cmd, &global),
        Commands::Options(args) => dcalc::cli::commands::options::run(args, &global),
        Commands::Next(args) => dcalc::cli::commands::next::run(args, &global),
        Commands::Resolve(args) => dcalc::cli::commands::resolve::run(args, &global),
        Commands::Lookup(args) => dcalc::cli::commands::lookup::run(args, &global),
        Commands::Search(args) => dcalc::cli::commands::search::run(args, &global),
        Commands::Import(args) => dcalc::cli::commands::import::run(args, &global),
        Commands::Store(cmd) => dcalc::cli::commands::store::run(cmd, &global),
    }
}

/// Logs go to stderr so stdout stays clean for payloads
fn init_tracing(global: &GlobalOpts) {
    let default_level = if global.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("dcalc={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
