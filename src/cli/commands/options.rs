//! `dcalc options` command - Unique values among matching records

use miette::Result;

use crate::cli::commands::QuizArgs;
use crate::cli::helpers::Workspace;
use crate::cli::output::emit;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub quiz: QuizArgs,

    /// Field to aggregate (repeatable; none returns whole records)
    #[arg(long = "field", short = 'F', value_name = "FIELD")]
    pub fields: Vec<String>,
}

pub fn run(args: OptionsArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let answers = args.quiz.answer_set()?;

    let result = ws
        .engine()
        .options(&args.quiz.calculator_type, &answers, &args.fields)?;

    emit(&result, ws.format(global))
}
