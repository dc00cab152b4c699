//! Tool error types

use fixgen_eof::EofError;
use fixgen_types::TypesError;
use thiserror::Error;

/// Errors from driving an external or built-in tool
#[derive(Debug, Error)]
pub enum ToolError {
    /// The binary could not be started
    #[error("failed to start {binary}: {source}")]
    Spawn {
        /// Binary path
        binary: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Pipe or wait failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool exited with a status it must not use
    #[error("{tool} exited with status {status:?}: {stderr}")]
    ExitStatus {
        /// Tool name
        tool: String,
        /// Exit code, `None` when killed by a signal
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The tool wrote something that is not its documented output
    #[error("malformed output from {tool}: {reason}")]
    MalformedOutput {
        /// Tool name
        tool: String,
        /// What was wrong
        reason: String,
    },

    /// Request could not be built
    #[error("invalid request: {0}")]
    Request(#[from] TypesError),

    /// Built-in EOF validator failure other than a rejection
    #[error(transparent)]
    Eof(#[from] EofError),
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;
