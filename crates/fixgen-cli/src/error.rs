//! CLI error types

use fixgen_exceptions::ExceptionError;
use fixgen_fixtures::FixtureError;
use fixgen_specs::SpecError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Config file cannot be read or parsed
    #[error("Config error in {path}: {reason}")]
    Config {
        /// File path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Exception mapper cannot be built
    #[error("Mapper error: {0}")]
    Mapper(#[from] ExceptionError),

    /// Spec loading or filling failed
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Fixture writing or verification failed
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Some fixtures could not be filled
    #[error("{0} fixture(s) failed to fill")]
    FillFailed(usize),

    /// Some fixtures did not verify
    #[error("{0} fixture(s) failed verification")]
    VerifyFailed(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;
