//! CLI command implementations

pub mod calc;
pub mod import;
pub mod init;
pub mod lookup;
pub mod next;
pub mod options;
pub mod resolve;
pub mod search;
pub mod store;

/// Calculator type plus answers, shared by the quiz commands
#[derive(clap::Args, Debug, Clone)]
pub struct QuizArgs {
    /// Calculator type (see `dcalc calc list`)
    pub calculator_type: String,

    /// Answered quiz field, as FIELD=VALUE (repeatable)
    #[arg(long = "answer", short = 'a', value_name = "FIELD=VALUE")]
    pub answers: Vec<String>,

    /// Parse answer values as JSON scalars so numbers can be matched
    #[arg(long)]
    pub json_values: bool,
}

impl QuizArgs {
    pub fn answer_set(&self) -> miette::Result<crate::core::calculator::AnswerSet> {
        crate::cli::helpers::parse_answers(&self.answers, self.json_values)
    }
}
