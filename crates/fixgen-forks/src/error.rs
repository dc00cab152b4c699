//! Fork table errors

use thiserror::Error;

/// Errors from fork name parsing and rule lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForkError {
    /// Name matches neither a fork nor a transition fork
    #[error("unknown fork: {0}")]
    UnknownFork(String),

    /// A transaction type the fork does not accept
    #[error("transaction type {tx_type} is not supported by {fork}")]
    UnsupportedTxType {
        /// Transaction type byte
        tx_type: u8,
        /// Fork name
        fork: String,
    },
}

/// Result type for fork operations
pub type ForkResult<T> = Result<T, ForkError>;
