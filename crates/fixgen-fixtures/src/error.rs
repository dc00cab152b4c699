//! Fixture errors

use fixgen_block::BlockError;
use fixgen_primitives::H256;
use fixgen_rlp::RlpError;
use fixgen_types::TypesError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from building, writing and checking fixtures
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Filesystem failure
    #[error("io error at {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Recomputed content hash differs from the recorded one
    #[error("hash mismatch: recorded {old}, computed {new}")]
    HashMismatch {
        /// Recorded hash
        old: H256,
        /// Recomputed hash
        new: H256,
    },

    /// Fixture without an `_info` object or format
    #[error("missing _info: {0}")]
    MissingInfo(String),

    /// Format name not in the registry
    #[error("unknown fixture format {0}")]
    UnknownFormat(String),

    /// A header's recorded hash does not match its fields or its RLP
    #[error("block {index}: header hash {recorded} but {computed} recomputed")]
    HeaderHashMismatch {
        /// Block position, or `genesis`
        index: String,
        /// Hash in the fixture
        recorded: H256,
        /// Hash recomputed
        computed: H256,
    },

    /// Block RLP of a valid block does not decode
    #[error("block {index}: bad rlp: {source}")]
    BlockRlp {
        /// Block position
        index: usize,
        /// Decoding failure
        source: RlpError,
    },

    /// Block assembly failure
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Transaction or value type failure
    #[error(transparent)]
    Types(#[from] TypesError),
}

impl FixtureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixtureError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;
