//! All error types for the culturefmt crate.
//!
//! Errors are only produced while *building* things (configurations, caches,
//! custom patterns, loading translation files). Formatting absorbs failures into
//! best-effort strings, parsing returns `None`, and validation problems are
//! reported as [`crate::validation::ValidationIssue`] values.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid locale identifier `{0}`")]
    InvalidLocale(String),

    #[error("unknown audience `{0}`")]
    UnknownAudience(String),

    #[error("unknown currency `{0}`")]
    UnknownCurrency(String),

    #[error("invalid date pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }

    /// Creates a new unknown-currency error
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        Error::UnknownCurrency(code.into())
    }

    /// Creates a new pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
