//! `dcalc lookup` command - The one record matching the answers

use miette::Result;

use crate::cli::commands::QuizArgs;
use crate::cli::helpers::Workspace;
use crate::cli::output::emit;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    #[command(flatten)]
    pub quiz: QuizArgs,
}

pub fn run(args: LookupArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let answers = args.quiz.answer_set()?;

    let record = ws.engine().lookup(&args.quiz.calculator_type, &answers)?;
    emit(&record, ws.format(global))
}
