//! Block building errors

use fixgen_forks::{Fork, HeaderField};
use fixgen_primitives::H256;
use fixgen_rlp::RlpError;
use fixgen_types::TypesError;
use thiserror::Error;

/// Errors from assembling headers, blocks and payloads
#[derive(Debug, Error)]
pub enum BlockError {
    /// A field the fork requires has no value
    #[error("header field {field} is required by {fork}")]
    MissingRequiredField {
        /// Missing field
        field: HeaderField,
        /// Active fork
        fork: Fork,
    },

    /// A field the fork forbids has a value (strict mode only)
    #[error("header field {field} is not allowed in {fork}")]
    ForbiddenField {
        /// Offending field
        field: HeaderField,
        /// Active fork
        fork: Fork,
    },

    /// Recomputed receipts root differs from the tool's
    #[error("receipts root mismatch: tool {tool}, computed {computed}")]
    ReceiptsRootMismatch {
        /// Root reported by the tool
        tool: H256,
        /// Root recomputed from the receipts
        computed: H256,
    },

    /// Recomputed requests hash differs from the tool's
    #[error("requests hash mismatch: tool {tool}, computed {computed}")]
    RequestsHashMismatch {
        /// Hash reported by the tool
        tool: H256,
        /// Hash recomputed from the requests
        computed: H256,
    },

    /// Tool reported blob gas that does not match the included blobs
    #[error("blob gas used mismatch: tool {tool}, computed {computed}")]
    BlobGasUsedMismatch {
        /// Value reported by the tool
        tool: u64,
        /// Blob gas per blob times included blobs
        computed: u64,
    },

    /// Built header differs from the expected values
    #[error("header field {field} mismatch: expected {expected}, got {actual}")]
    HeaderVerifyMismatch {
        /// Differing field
        field: HeaderField,
        /// Expected rendering
        expected: String,
        /// Actual rendering
        actual: String,
    },

    /// A header patch cannot be applied
    #[error("invalid header patch: {0}")]
    InvalidPatch(String),

    /// Unknown header field name in a patch
    #[error("unknown header field {0}")]
    UnknownField(String),

    /// The fork has no engine API
    #[error("{0} has no engine API")]
    EngineUnsupported(Fork),

    /// RLP failure
    #[error("rlp error: {0}")]
    Rlp(#[from] RlpError),

    /// Transaction or value type failure
    #[error(transparent)]
    Types(#[from] TypesError),

    /// JSON conversion failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for block operations
pub type BlockResult<T> = Result<T, BlockError>;
