//! `blockchain_test` and `blockchain_test_engine` fixtures

use crate::info::FixtureInfo;
use crate::state::FixtureConfig;
use fixgen_block::{FixtureBlockEntry, FixtureEngineNewPayload, FixtureHeader};
use fixgen_primitives::{Bytes, H256};
use fixgen_types::Alloc;
use serde::{Deserialize, Serialize};

/// Seal engine of every generated chain
pub const SEAL_ENGINE: &str = "NoProof";

/// `blockchain_test` fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainFixture {
    /// Fork or transition fork name
    pub network: String,
    /// Genesis header
    pub genesis_block_header: FixtureHeader,
    /// Genesis block RLP
    #[serde(rename = "genesisRLP")]
    pub genesis_rlp: Bytes,
    /// Blocks in import order
    pub blocks: Vec<FixtureBlockEntry>,
    /// Hash of the head after import
    #[serde(rename = "lastblockhash")]
    pub last_block_hash: H256,
    /// Pre-state
    pub pre: Alloc,
    /// Post-state, absent when only the hash is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_state: Option<Alloc>,
    /// Post-state root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_state_hash: Option<H256>,
    /// Seal engine
    pub seal_engine: String,
    /// Chain configuration
    pub config: FixtureConfig,
    /// Metadata
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
}

/// `blockchain_test_engine` fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainEngineFixture {
    /// Fork or transition fork name
    pub network: String,
    /// Genesis header
    pub genesis_block_header: FixtureHeader,
    /// Payloads in delivery order
    pub engine_new_payloads: Vec<FixtureEngineNewPayload>,
    /// Hash of the head after delivery
    #[serde(rename = "lastblockhash")]
    pub last_block_hash: H256,
    /// Pre-state
    pub pre: Alloc,
    /// Post-state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_state: Option<Alloc>,
    /// Post-state root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_state_hash: Option<H256>,
    /// Chain configuration
    pub config: FixtureConfig,
    /// Metadata
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
}
