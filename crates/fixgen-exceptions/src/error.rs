//! Mapper construction errors

use thiserror::Error;

/// Errors raised while parsing exception names or building a mapper table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExceptionError {
    /// Text is not `<Class>.<NAME>` with a known class and name
    #[error("unknown exception: {0}")]
    UnknownException(String),

    /// Client name not recognized
    #[error("unknown client: {0}")]
    UnknownClient(String),

    /// The same literal appears twice in one client table
    #[error("{client}: duplicate substring {literal:?}")]
    DuplicateSubstring {
        /// Client owning the table
        client: String,
        /// The repeated literal
        literal: String,
    },

    /// The same pattern appears twice in one client table
    #[error("{client}: duplicate regex {pattern:?}")]
    DuplicateRegex {
        /// Client owning the table
        client: String,
        /// The repeated pattern
        pattern: String,
    },

    /// Pattern does not compile
    #[error("{client}: invalid regex {pattern:?}: {reason}")]
    InvalidRegex {
        /// Client owning the table
        client: String,
        /// The pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

/// Result type for exception operations
pub type ExceptionResult<T> = Result<T, ExceptionError>;
