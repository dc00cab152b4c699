//! # fixgen-specs
//!
//! Turns declarative test specs into sealed fixtures.
//!
//! A [`TestCase`] names the networks to fill for and holds one [`TestSpec`].
//! [`fill`] produces one fixture for a (network, format) pair:
//!
//! - state tests run one transaction through the transition tool, or are
//!   lowered to a one-block chain for the blockchain formats
//! - blockchain tests execute block by block, carrying state across valid
//!   blocks and keeping invalid ones off the chain
//! - EOF tests ask the validator for each container's verdict
//! - transaction tests are checked locally
//!
//! Tool rejections are classified with the client's exception mapper and
//! compared against the expected exceptions. Any divergence aborts the
//! fixture. [`FillRunner`] fans the work out over a rayon pool.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chain;
mod context;
mod eof;
mod error;
mod fill;
mod groups;
mod reconcile;
mod runner;
mod spec;
mod state;
mod transaction;

pub use chain::{generate_chain, ChainBlock, GeneratedChain};
pub use context::{FillContext, DEFAULT_CHAIN_ID};
pub use eof::{check_vector, fill_eof_test, lower_eof_state_test, CONTAINER_ADDRESS, SENDER_BALANCE};
pub use error::{SpecError, SpecResult};
pub use fill::{fill, fixture_id, GroupTarget};
pub use groups::PreAllocGroups;
pub use reconcile::{check_receipts, reconcile_transactions};
pub use runner::{collect_spec_files, FillJob, FillReport, FillRunner, FillStats, FilledFixture};
pub use spec::{
    load_spec_file, BlockSpec, BlockchainTestSpec, EofStateTestSpec, EofTestSpec, EofVectorSpec,
    StateTestSpec, TestCase, TestSpec, TransactionTestSpec,
};
pub use state::{fill_state_test, lower_state_test};
pub use transaction::fill_transaction_test;
