//! Orchestration errors

use fixgen_block::BlockError;
use fixgen_exceptions::{ExceptionKind, ExceptionList};
use fixgen_fixtures::{FixtureError, FixtureFormat};
use fixgen_forks::{Fork, ForkError};
use fixgen_tools::ToolError;
use fixgen_types::{PostStateError, ReceiptMismatch, TypesError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort one test
#[derive(Debug, Error)]
pub enum SpecError {
    /// Transaction succeeded but was expected to fail
    #[error("tx {index} (nonce {nonce}): expected {expected} but it succeeded")]
    UnexpectedSuccess {
        /// Position in the block
        index: usize,
        /// Transaction nonce
        nonce: u64,
        /// Expected exceptions
        expected: ExceptionList,
    },

    /// Transaction failed but was expected to succeed
    #[error("tx {index} (nonce {nonce}): unexpected failure {kind}: {message}")]
    UnexpectedFailure {
        /// Position in the block
        index: usize,
        /// Transaction nonce
        nonce: u64,
        /// Classified failure
        kind: ExceptionKind,
        /// Raw tool message
        message: String,
    },

    /// Transaction failed with an exception not in the expected set
    #[error("tx {index} (nonce {nonce}): expected {expected}, got {got}: {message}")]
    ExceptionMismatch {
        /// Position in the block
        index: usize,
        /// Transaction nonce
        nonce: u64,
        /// Expected exceptions
        expected: ExceptionList,
        /// Classified failure
        got: ExceptionKind,
        /// Raw tool message
        message: String,
    },

    /// A receipt field differs from the expectation
    #[error("tx {index} (nonce {nonce}): {source}")]
    Receipt {
        /// Position in the block
        index: usize,
        /// Transaction nonce
        nonce: u64,
        /// Differing field
        source: ReceiptMismatch,
    },

    /// Post-state differs from the expectation
    #[error("post state: {0}")]
    PostState(#[from] PostStateError),

    /// EOF verdict differs from the expectation
    #[error("eof vector {vector}: expected {}, got {}", fmt_verdict(.expected), fmt_kind(.got))]
    EofMismatch {
        /// Vector position
        vector: usize,
        /// Expected exceptions, `None` for valid
        expected: Option<ExceptionList>,
        /// Observed exception, `None` for valid
        got: Option<ExceptionKind>,
    },

    /// The test cannot produce the format
    #[error("{spec} cannot produce {format}")]
    UnsupportedFormat {
        /// Spec type name
        spec: &'static str,
        /// Requested format
        format: FixtureFormat,
    },

    /// The test cannot run on the fork
    #[error("{spec} cannot run on {fork}: {reason}")]
    UnsupportedFork {
        /// Spec type name
        spec: &'static str,
        /// Requested fork
        fork: Fork,
        /// Why
        reason: String,
    },

    /// Spec file cannot be read or parsed
    #[error("spec file {path}: {reason}")]
    SpecFile {
        /// File path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Spec content is inconsistent
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// Worker pool cannot be built
    #[error("thread pool: {0}")]
    Pool(String),

    /// Header or block assembly failure
    #[error(transparent)]
    Block(#[from] BlockError),

    /// External tool failure
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Value type failure
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Fork rule failure
    #[error(transparent)]
    Fork(#[from] ForkError),

    /// Fixture rendering failure
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

fn fmt_verdict(expected: &Option<ExceptionList>) -> String {
    expected
        .as_ref()
        .map_or_else(|| "valid".to_string(), ToString::to_string)
}

fn fmt_kind(got: &Option<ExceptionKind>) -> String {
    got.map_or_else(|| "valid".to_string(), |k| k.to_string())
}

/// Result type for orchestration
pub type SpecResult<T> = Result<T, SpecError>;
