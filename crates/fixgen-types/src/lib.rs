//! # fixgen-types
//!
//! Value types that flow between test specs, the transition tool and fixtures.
//!
//! - [`Account`], [`Alloc`] and [`Storage`] with state roots and merging
//! - [`ExpectedAlloc`] post-state expectations
//! - [`Environment`] with fork-driven defaults
//! - [`Transaction`] signing and encoding for every transaction type
//! - [`Receipt`], [`Log`] and [`Bloom`]
//! - withdrawals root and requests hash

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod environment;
mod error;
mod expect;
mod receipt;
mod requests;
mod transaction;
mod withdrawal;

pub use account::{Account, Alloc, Storage};
pub use environment::{
    Environment, ParentBlock, BLOCK_TIME, DEFAULT_BASE_FEE, DEFAULT_DIFFICULTY,
    DEFAULT_FEE_RECIPIENT, DEFAULT_GAS_LIMIT,
};
pub use error::{PostStateError, ReceiptMismatch, TypesError, TypesResult};
pub use expect::{AccountExpectation, ExpectedAccount, ExpectedAlloc};
pub use receipt::{logs_bloom, logs_hash, receipts_root, Bloom, Log, Receipt, TransactionReceipt};
pub use requests::{
    requests_hash, CONSOLIDATION_REQUEST_TYPE, DEPOSIT_REQUEST_TYPE, WITHDRAWAL_REQUEST_TYPE,
};
pub use transaction::{
    AccessListEntry, Authorization, Transaction, DEFAULT_RECIPIENT, DEFAULT_SECRET_KEY,
};
pub use withdrawal::{withdrawals_root, Withdrawal};
