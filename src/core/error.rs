//! Engine error kinds
//!
//! Every failure that can cross the core boundary is one of four kinds.
//! `NotFound` and `Validation` carry a message meant for the caller;
//! `Store` hides the underlying cause behind a generic message and keeps it
//! only as the error source so it can be logged.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// Unknown calculator/output type, or no record for a direct lookup
    #[error("{0}")]
    #[diagnostic(code(dcalc::not_found))]
    NotFound(String),

    /// Malformed or missing request fields
    #[error("{0}")]
    #[diagnostic(
        code(dcalc::validation),
        help("answered fields must be quiz fields of the calculator type; see `dcalc calc list`")
    )]
    Validation(String),

    /// More than one record matched where exactly one was required
    #[error("{count} records of {calculator_type} match; exactly one was expected")]
    #[diagnostic(
        code(dcalc::ambiguous),
        help("answer more quiz fields to narrow the match")
    )]
    AmbiguousMatch {
        calculator_type: String,
        count: usize,
    },

    /// The record store is unreachable or a query failed
    #[error("internal store error")]
    #[diagnostic(code(dcalc::store))]
    Store(#[source] rusqlite::Error),
}

impl EngineError {
    pub fn not_found(message: impl Into<String>) -> Self {
        EngineError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    /// HTTP status equivalent for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::NotFound(_) => 404,
            EngineError::Validation(_) => 400,
            EngineError::AmbiguousMatch { .. } => 409,
            EngineError::Store(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::error!(error = %err, "record store query failed");
        EngineError::Store(err)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Store(rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
