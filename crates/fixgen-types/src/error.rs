//! Type-level errors

use fixgen_crypto::CryptoError;
use fixgen_forks::ForkError;
use fixgen_primitives::{Address, Bytes, U256};
use thiserror::Error;

/// Errors raised while building or combining values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Two allocations disagree on a field of the same account
    #[error("alloc collision at {address}: {field} differs")]
    AllocCollision {
        /// Account address
        address: Address,
        /// Field name
        field: String,
    },

    /// Transaction fields do not form a valid transaction
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Signing or recovery failed
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Fork rule violated
    #[error("fork error: {0}")]
    Fork(#[from] ForkError),
}

/// Post-state verification failures. Each failure kind is distinct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostStateError {
    /// Expected account absent from the post state
    #[error("missing account {address}")]
    MissingAccount {
        /// Account address
        address: Address,
    },

    /// Account present that was expected not to exist
    #[error("unexpected account {address}")]
    UnexpectedAccount {
        /// Account address
        address: Address,
    },

    /// Nonce differs
    #[error("nonce mismatch at {address}: expected {expected}, got {actual}")]
    NonceMismatch {
        /// Account address
        address: Address,
        /// Expected nonce
        expected: u64,
        /// Actual nonce
        actual: u64,
    },

    /// Balance differs
    #[error("balance mismatch at {address}: expected {expected}, got {actual}")]
    BalanceMismatch {
        /// Account address
        address: Address,
        /// Expected balance
        expected: U256,
        /// Actual balance
        actual: U256,
    },

    /// Code differs
    #[error("code mismatch at {address}: expected {expected}, got {actual}")]
    CodeMismatch {
        /// Account address
        address: Address,
        /// Expected code
        expected: Bytes,
        /// Actual code
        actual: Bytes,
    },

    /// A storage slot differs
    #[error("storage mismatch at {address}[{key:#x}]: expected {expected:#x}, got {actual:#x}")]
    StorageMismatch {
        /// Account address
        address: Address,
        /// Slot key
        key: U256,
        /// Expected value
        expected: U256,
        /// Actual value
        actual: U256,
    },
}

/// A receipt field differs from its expectation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("receipt {field} mismatch: expected {expected}, got {actual}")]
pub struct ReceiptMismatch {
    /// Receipt field name
    pub field: &'static str,
    /// Expected value
    pub expected: String,
    /// Actual value
    pub actual: String,
}

/// Result type for type construction
pub type TypesResult<T> = Result<T, TypesError>;
