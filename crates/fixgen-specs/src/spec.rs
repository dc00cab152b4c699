//! Declarative test specs as read from spec files.
//!
//! A spec file is a JSON object of named test cases:
//!
//! ```json
//! {
//!   "transfer": {
//!     "networks": ["Shanghai", "Cancun"],
//!     "spec": { "type": "StateTest", "pre": {...}, "tx": {...}, "post": {...} }
//!   }
//! }
//! ```

use crate::error::{SpecError, SpecResult};
use fixgen_block::HeaderPatch;
use fixgen_eof::ContainerKind;
use fixgen_exceptions::ExceptionList;
use fixgen_fixtures::FixtureFormat;
use fixgen_forks::Network;
use fixgen_primitives::serde_hex::{opt_padded_u64, padded_u64};
use fixgen_primitives::{Address, Bytes, H256};
use fixgen_types::{Alloc, Environment, ExpectedAccount, ExpectedAlloc, Transaction, Withdrawal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One named test: what to build and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Forks or transition forks to fill for
    pub networks: Vec<Network>,
    /// Formats to produce, every supported one when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<FixtureFormat>,
    /// Recorded in `_info.description`
    #[serde(default)]
    pub description: String,
    /// Recorded in `_info.url`
    #[serde(default)]
    pub url: String,
    /// The test itself
    pub spec: TestSpec,
}

impl TestCase {
    /// Formats to fill: the requested ones the spec supports, or all it supports
    pub fn selected_formats(&self) -> Vec<FixtureFormat> {
        let supported = self.spec.formats();
        if self.formats.is_empty() {
            return supported;
        }
        self.formats
            .iter()
            .copied()
            .filter(|f| supported.contains(f))
            .collect()
    }
}

/// The test variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TestSpec {
    /// One transaction against a pre-state
    StateTest(StateTestSpec),
    /// A chain of blocks
    BlockchainTest(BlockchainTestSpec),
    /// A chain of blocks delivered over the engine API only
    BlockchainTestEngine(BlockchainTestSpec),
    /// Standalone EOF containers
    #[serde(rename = "EOFTest")]
    EofTest(EofTestSpec),
    /// One EOF container, validated and then executed
    #[serde(rename = "EOFStateTest")]
    EofStateTest(EofStateTestSpec),
    /// Transaction decoding and intrinsic validity
    TransactionTest(TransactionTestSpec),
}

impl TestSpec {
    /// Spec type name
    pub fn kind(&self) -> &'static str {
        match self {
            TestSpec::StateTest(_) => "StateTest",
            TestSpec::BlockchainTest(_) => "BlockchainTest",
            TestSpec::BlockchainTestEngine(_) => "BlockchainTestEngine",
            TestSpec::EofTest(_) => "EOFTest",
            TestSpec::EofStateTest(_) => "EOFStateTest",
            TestSpec::TransactionTest(_) => "TransactionTest",
        }
    }

    /// Formats the spec can produce
    pub fn formats(&self) -> Vec<FixtureFormat> {
        use FixtureFormat::*;
        match self {
            TestSpec::StateTest(_) => vec![StateTest, BlockchainTest, BlockchainTestEngine],
            TestSpec::BlockchainTest(_) => vec![BlockchainTest, BlockchainTestEngine],
            TestSpec::BlockchainTestEngine(_) => vec![BlockchainTestEngine],
            TestSpec::EofTest(_) => vec![EofTest],
            // an invalid container has nothing to execute
            TestSpec::EofStateTest(s) if s.expect_exception.is_some() => vec![EofTest],
            TestSpec::EofStateTest(_) => {
                vec![EofTest, StateTest, BlockchainTest, BlockchainTestEngine]
            }
            TestSpec::TransactionTest(_) => vec![TransactionTest],
        }
    }
}

/// Single-transaction test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTestSpec {
    /// Block environment
    #[serde(default)]
    pub env: Environment,
    /// Pre-state
    pub pre: Alloc,
    /// The transaction, with `error` set when it must be rejected
    pub tx: Transaction,
    /// Expected post-state
    #[serde(default)]
    pub post: ExpectedAlloc,
}

fn genesis_environment() -> Environment {
    Environment {
        number: 0,
        timestamp: 0,
        ..Default::default()
    }
}

/// Multi-block test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainTestSpec {
    /// Genesis environment
    #[serde(default = "genesis_environment")]
    pub genesis_environment: Environment,
    /// Genesis pre-state
    pub pre: Alloc,
    /// Blocks in import order
    pub blocks: Vec<BlockSpec>,
    /// Expected state after the last valid block
    #[serde(default)]
    pub post: ExpectedAlloc,
}

/// One block of a [`BlockchainTestSpec`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockSpec {
    /// Transactions
    pub txs: Vec<Transaction>,
    /// Coinbase, inherited from the genesis environment when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<Address>,
    /// Timestamp, parent plus block time when unset
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Extra data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<Bytes>,
    /// Prev-randao
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_randao: Option<H256>,
    /// Withdrawals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// Beacon root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<H256>,
    /// Overrides applied after the header is built
    #[serde(skip_serializing_if = "HeaderPatch::is_empty")]
    pub header_patch: HeaderPatch,
    /// Values the built header must have
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_verify: Option<HeaderPatch>,
    /// Block RLP to write instead of the built block's
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rlp: Option<Bytes>,
    /// Exceptions the block must be rejected with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionList>,
    /// JSON-RPC error code an engine client must answer with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_error_code: Option<i64>,
}

impl BlockSpec {
    /// Whether the block must be rejected
    pub fn is_invalid(&self) -> bool {
        self.exception.is_some()
    }
}

/// One container of an [`EofTestSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EofVectorSpec {
    /// Container bytes
    pub code: Bytes,
    /// How the container is used
    #[serde(default)]
    pub container_kind: ContainerKind,
    /// Exceptions the container must be rejected with, valid when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_exception: Option<ExceptionList>,
}

/// Standalone container test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EofTestSpec {
    /// Containers
    pub vectors: Vec<EofVectorSpec>,
}

fn default_call_gas() -> u64 {
    10_000_000
}

/// Container test that also executes a valid container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EofStateTestSpec {
    /// Container bytes
    pub container: Bytes,
    /// How the container is used
    #[serde(default)]
    pub container_kind: ContainerKind,
    /// Exceptions the container must be rejected with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_exception: Option<ExceptionList>,
    /// Accounts besides the container and the sender
    #[serde(default)]
    pub pre: Alloc,
    /// Block environment
    #[serde(default)]
    pub env: Environment,
    /// Call data of the calling transaction
    #[serde(default)]
    pub data: Bytes,
    /// Gas limit of the calling transaction
    #[serde(default = "default_call_gas", with = "padded_u64")]
    pub gas_limit: u64,
    /// Expected state of the container account after the call
    #[serde(default)]
    pub container_post: ExpectedAccount,
}

/// Transaction validity test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTestSpec {
    /// The transaction, with `error` set when it is invalid
    pub tx: Transaction,
}

/// Read a spec file: a JSON object of named [`TestCase`]s
pub fn load_spec_file(path: &Path) -> SpecResult<BTreeMap<String, TestCase>> {
    let raw = std::fs::read_to_string(path).map_err(|e| SpecError::SpecFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| SpecError::SpecFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
