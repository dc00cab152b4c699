//! RLP decoding errors

use thiserror::Error;

/// Strict RLP decoding error
///
/// Every variant describes input that a canonical encoder would never produce.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RlpError {
    /// Input ended before the announced payload
    #[error("truncated input: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required by the header
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    /// Bytes left over after the top-level item
    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),

    /// Single byte below 0x80 wrapped in a string header
    #[error("single byte below 0x80 must encode as itself")]
    NonCanonicalSingleByte,

    /// Long-form length used for a payload shorter than 56 bytes
    #[error("long-form length {0} should use the short form")]
    NonCanonicalLength(usize),

    /// Length-of-length field starting with a zero byte
    #[error("length field has leading zero bytes")]
    LeadingZeroLength,

    /// Integer payload starting with a zero byte
    #[error("integer has leading zero bytes")]
    LeadingZeroInteger,

    /// Integer wider than the target type
    #[error("integer of {0} bytes overflows target type")]
    IntegerOverflow(usize),

    /// Announced length does not fit in memory
    #[error("length overflow")]
    LengthOverflow,

    /// A byte string was expected
    #[error("expected byte string, found list")]
    ExpectedBytes,

    /// A list was expected
    #[error("expected list, found byte string")]
    ExpectedList,

    /// Fixed-width value has the wrong size
    #[error("expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required width
        expected: usize,
        /// Actual width
        got: usize,
    },

    /// List has the wrong number of elements
    #[error("expected {expected} list items, got {got}")]
    InvalidListLength {
        /// Required item count
        expected: usize,
        /// Actual item count
        got: usize,
    },
}

/// Result alias for RLP decoding
pub type RlpResult<T> = Result<T, RlpError>;
