//! Core module - calculator types, the record store and project plumbing

pub mod calculator;
pub mod config;
pub mod error;
pub mod project;
pub mod registry;
pub mod store;

pub use calculator::{AnswerSet, CalculatorTable, CalculatorTableError, CalculatorType, Record};
pub use config::{Config, ConfigError};
pub use error::{EngineError, EngineResult};
pub use project::{Project, ProjectError};
pub use registry::{Registry, WarmUpStats};
pub use store::{CollectionHandle, RecordStore};
