//! Core Error Types
//!
//! Errors raised while parsing and validating engine inputs: sort keys,
//! recurrence periods, dates, and date windows. The engine itself never fails
//! on record data; bad records degrade to placeholders or empty progress.
//!
//! The application crate wraps these and adds the I/O-facing variants (config
//! files, data source failures, cancellation).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Well-formed input that breaks a rule, such as a window ending before it starts
    #[error("Validation error: {0}")]
    Validation(String),

    /// Text that does not parse (sort keys, periods, dates)
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
