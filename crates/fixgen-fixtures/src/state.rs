//! `state_test` fixtures

use crate::error::FixtureResult;
use crate::info::FixtureInfo;
use fixgen_exceptions::ExceptionList;
use fixgen_forks::Fork;
use fixgen_primitives::serde_hex::{
    opt_padded_u256, opt_padded_u64, padded_u64, HexU256, HexU64,
};
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_types::{AccessListEntry, Alloc, Authorization, Environment, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain configuration carried by every executable fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureConfig {
    /// Chain id
    #[serde(rename = "chainid", with = "padded_u64")]
    pub chain_id: u64,
    /// Blob parameters by fork name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_schedule: Option<BTreeMap<String, fixgen_forks::BlobSchedule>>,
}

impl FixtureConfig {
    /// Configuration for `fork` on `chain_id`
    pub fn new(fork: Fork, chain_id: u64) -> Self {
        let table = fork.blob_schedule_table();
        Self {
            chain_id,
            blob_schedule: (!table.is_empty())
                .then(|| table.into_iter().map(|(name, s)| (name.to_string(), s)).collect()),
        }
    }
}

/// Environment in state test naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureEnvironment {
    /// Coinbase
    pub current_coinbase: Address,
    /// Gas limit
    #[serde(with = "padded_u64")]
    pub current_gas_limit: u64,
    /// Block number
    #[serde(with = "padded_u64")]
    pub current_number: u64,
    /// Timestamp
    #[serde(with = "padded_u64")]
    pub current_timestamp: u64,
    /// Prev-randao
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_random: Option<H256>,
    /// Difficulty
    #[serde(default, with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub current_difficulty: Option<U256>,
    /// Base fee
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub current_base_fee: Option<u64>,
    /// Excess blob gas
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub current_excess_blob_gas: Option<u64>,
}

impl From<&Environment> for FixtureEnvironment {
    fn from(env: &Environment) -> Self {
        Self {
            current_coinbase: env.fee_recipient,
            current_gas_limit: env.gas_limit,
            current_number: env.number,
            current_timestamp: env.timestamp,
            current_random: env.prev_randao,
            current_difficulty: env.difficulty,
            current_base_fee: env.base_fee_per_gas,
            current_excess_blob_gas: env.excess_blob_gas,
        }
    }
}

/// Transaction with the indexable fields as single-element lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFixtureTransaction {
    /// Sender nonce
    #[serde(with = "padded_u64")]
    pub nonce: u64,
    /// Legacy gas price
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// Tip cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u64>,
    /// Fee cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u64>,
    /// Gas limits
    pub gas_limit: Vec<HexU64>,
    /// Recipient, `null` for creation
    pub to: Option<Address>,
    /// Values
    pub value: Vec<HexU256>,
    /// Call data
    pub data: Vec<Bytes>,
    /// Access lists, one per data entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_lists: Option<Vec<Vec<AccessListEntry>>>,
    /// Blob fee cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_blob_gas: Option<u64>,
    /// Blob hashes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_versioned_hashes: Option<Vec<H256>>,
    /// Authorizations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_list: Option<Vec<Authorization>>,
    /// Sender
    pub sender: Address,
    /// Signing key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<H256>,
}

impl StateFixtureTransaction {
    /// Render a signed transaction
    pub fn from_signed(tx: &Transaction) -> FixtureResult<Self> {
        let authorization_list = tx.authorization_list.as_ref().map(|list| {
            list.iter()
                .cloned()
                .map(|mut auth| {
                    auth.secret_key = None;
                    auth
                })
                .collect()
        });
        Ok(Self {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
            max_fee_per_gas: tx.max_fee_per_gas,
            gas_limit: vec![HexU64(tx.gas_limit)],
            to: tx.to,
            value: vec![HexU256(tx.value)],
            data: vec![tx.data.clone()],
            access_lists: tx.access_list.clone().map(|l| vec![l]),
            max_fee_per_blob_gas: tx.max_fee_per_blob_gas,
            blob_versioned_hashes: tx.blob_versioned_hashes.clone(),
            authorization_list,
            sender: tx.sender()?,
            secret_key: tx.secret_key,
        })
    }
}

/// Indices into the transaction's lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateIndexes {
    /// Data index
    pub data: u64,
    /// Gas index
    pub gas: u64,
    /// Value index
    pub value: u64,
}

/// Outcome for one index combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePost {
    /// Post-state root
    pub hash: H256,
    /// Logs hash
    pub logs: H256,
    /// Network-encoded transaction
    pub txbytes: Bytes,
    /// Index combination
    pub indexes: StateIndexes,
    /// Post-state
    pub state: Alloc,
    /// Expected rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_exception: Option<ExceptionList>,
}

/// `state_test` fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFixture {
    /// Block environment
    pub env: FixtureEnvironment,
    /// Pre-state
    pub pre: Alloc,
    /// Transaction
    pub transaction: StateFixtureTransaction,
    /// Outcomes by fork name
    pub post: BTreeMap<String, Vec<StatePost>>,
    /// Chain configuration
    pub config: FixtureConfig,
    /// Metadata
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
}
