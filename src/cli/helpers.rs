//! Shared helper functions for CLI commands
//!
//! Opening a project (config, calculator table, store) and turning
//! `FIELD=VALUE` arguments into answer sets are needed by almost every
//! command, so they live here.

use miette::Result;
use serde_json::Value;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::calculator::{AnswerSet, CalculatorTable};
use crate::core::config::Config;
use crate::core::project::Project;
use crate::core::registry::Registry;
use crate::core::store::RecordStore;
use crate::engine::Engine;

/// Everything a command needs from the current project
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub registry: Registry,
    pub store: RecordStore,
}

impl Workspace {
    /// Discover the project (or use `--project`), open its store and
    /// materialize every configured calculator type
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(root) => Project::discover_from(root),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load_for(Some(&project)).map_err(|e| miette::miette!("{}", e))?;

        let table = CalculatorTable::load(&project.calculators_path())
            .map_err(|e| miette::miette!("{}", e))?;
        let registry = Registry::new(table);

        let store_path = config.store_path(&project);
        debug!(store = %store_path.display(), "opening record store");
        let store = RecordStore::open(&store_path)?;
        registry.warm_up(&store)?;

        Ok(Self {
            project,
            config,
            registry,
            store,
        })
    }

    pub fn engine(&self) -> Engine<'_> {
        Engine::with_options(&self.registry, &self.store, self.config.engine_options())
    }

    /// Output format after applying the configured default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        global
            .format
            .or_configured(self.config.default_format.as_deref())
    }
}

/// Parse one `FIELD=VALUE` argument
///
/// The value is taken verbatim as a string unless `json_values` is set, in
/// which case it must be a JSON scalar (so `Implant Diameter=3.5` becomes a
/// number).
pub fn parse_answer(arg: &str, json_values: bool) -> Result<(String, Value)> {
    let (field, raw) = arg
        .split_once('=')
        .ok_or_else(|| miette::miette!("Invalid answer '{}': expected FIELD=VALUE", arg))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(miette::miette!("Invalid answer '{}': field name is empty", arg));
    }

    let value = if json_values {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| miette::miette!("Invalid JSON value for '{}': {}", field, e))?;
        if !(value.is_string() || value.is_number()) {
            return Err(miette::miette!(
                "Answer for '{}' must be a string or number",
                field
            ));
        }
        value
    } else {
        Value::String(raw.to_string())
    };

    Ok((field.to_string(), value))
}

/// Build an answer set; a field given twice keeps the last value
pub fn parse_answers(args: &[String], json_values: bool) -> Result<AnswerSet> {
    let mut answers = AnswerSet::new();
    for arg in args {
        let (field, value) = parse_answer(arg, json_values)?;
        answers.insert(field, value);
    }
    Ok(answers)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
