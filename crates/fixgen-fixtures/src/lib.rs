//! # fixgen-fixtures
//!
//! Serialized fixture formats and their on-disk layout.
//!
//! Every fixture carries an `_info` object whose `hash` is the sha256 of the
//! fixture's canonical JSON without `_info`. [`Fixture::seal`] records it and
//! [`verify_dir`] re-checks it, together with header hashes and block RLP,
//! for every file under an output directory.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod blockchain;
mod collector;
mod eof;
mod error;
mod fixture;
mod format;
mod info;
mod state;
mod transaction;
mod verify;

pub use blockchain::{BlockchainEngineFixture, BlockchainFixture, SEAL_ENGINE};
pub use collector::{
    read_json, write_json, FixtureCollector, FixtureIndex, IndexEntry, PreAllocGroupFile,
    INDEX_FILE, PRE_ALLOC_DIR,
};
pub use eof::{EofFixture, EofVector, EofVectorResult};
pub use error::{FixtureError, FixtureResult};
pub use fixture::Fixture;
pub use format::{FixtureFormat, FormatInfo, FORMATS};
pub use info::{content_hash, FixtureInfo, INFO_KEY};
pub use state::{
    FixtureConfig, FixtureEnvironment, StateFixture, StateFixtureTransaction, StateIndexes,
    StatePost,
};
pub use transaction::{TransactionFixture, TransactionFixtureResult};
pub use verify::{verify_dir, verify_fixture, VerifyFailure, VerifyReport};
