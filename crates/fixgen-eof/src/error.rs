//! EOF error types

use fixgen_exceptions::EofException;
use thiserror::Error;

/// Errors from building, validating or wrapping containers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EofError {
    /// The container breaks a validation rule
    #[error("invalid container: {0}")]
    Invalid(EofException),

    /// Legacy code cannot be embedded in a container
    #[error("cannot wrap code: {0}")]
    Unwrappable(String),

    /// A section does not fit its header size field
    #[error("{section} section of {size} bytes does not fit the header")]
    SectionTooLarge {
        /// Section name
        section: &'static str,
        /// Size in bytes
        size: usize,
    },
}

impl From<EofException> for EofError {
    fn from(e: EofException) -> Self {
        EofError::Invalid(e)
    }
}

impl EofError {
    /// Validation exception, if this is a validation failure
    pub fn exception(&self) -> Option<EofException> {
        match self {
            EofError::Invalid(e) => Some(*e),
            _ => None,
        }
    }
}

/// Result type for EOF operations
pub type EofResult<T> = Result<T, EofError>;
