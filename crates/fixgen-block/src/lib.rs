//! # fixgen-block
//!
//! Fork-correct headers and blocks.
//!
//! Headers are built through an explicit state machine
//! ([`PendingHeader`] → [`ValidatedHeader`] → [`FrozenHeader`]); RLP and hash
//! only exist on the frozen state, and overrides re-enter validation through
//! [`FrozenHeader::apply`]. [`BlockBuilder`] assembles blocks from transition
//! tool output, and [`FixtureEngineNewPayload`] renders them as engine API
//! calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
mod builder;
mod error;
mod header;
mod patch;
mod payload;

pub use block::{
    header_hash_from_block_rlp, Block, FixtureBlock, FixtureBlockBody, FixtureBlockEntry,
    FixtureTransaction, InvalidFixtureBlock,
};
pub use builder::{BlockBuilder, BuiltBlock};
pub use error::{BlockError, BlockResult};
pub use header::{
    FixtureHeader, FrozenHeader, Header, PendingHeader, ValidatedHeader, EMPTY_OMMERS_HASH,
};
pub use patch::{HeaderPatch, Patch};
pub use payload::{EngineWithdrawal, ExecutionPayload, FixtureEngineNewPayload};
