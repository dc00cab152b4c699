//! Block execution environment

use crate::withdrawal::Withdrawal;
use fixgen_forks::{calc_base_fee, calc_excess_blob_gas, Fork, HeaderField, Requirement};
use fixgen_primitives::serde_hex::{
    opt_padded_u256, opt_padded_u64, padded_u64, HexU64,
};
use fixgen_primitives::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default block gas limit
pub const DEFAULT_GAS_LIMIT: u64 = 100_000_000_000_000_000;
/// Base fee used when no parent values are available
pub const DEFAULT_BASE_FEE: u64 = 7;
/// Difficulty used before the merge when none is given
pub const DEFAULT_DIFFICULTY: u64 = 0x20000;
/// Seconds between a parent and its child
pub const BLOCK_TIME: u64 = 12;

/// Default coinbase of generated blocks
pub const DEFAULT_FEE_RECIPIENT: Address = Address::from_bytes([
    0x2a, 0xdc, 0x25, 0x66, 0x50, 0x18, 0xaa, 0x1f, 0xe0, 0xe6, 0xbc, 0x66, 0x6d, 0xac, 0x8f,
    0xc2, 0x69, 0x7f, 0xf9, 0xba,
]);

/// Fields excluded from the grouping fingerprint
const UNGROUPED_FIELDS: [&str; 4] = ["feeRecipient", "prevRandao", "timestamp", "extraData"];

/// Per-block execution context.
///
/// Unset optional fields are filled by [`Environment::set_fork_requirements`],
/// either from the `parent_*` fields or from fixed defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    /// Block coinbase
    pub fee_recipient: Address,
    /// Block gas limit
    #[serde(with = "padded_u64")]
    pub gas_limit: u64,
    /// Block number
    #[serde(with = "padded_u64")]
    pub number: u64,
    /// Block timestamp
    #[serde(with = "padded_u64")]
    pub timestamp: u64,
    /// Pre-merge difficulty
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<U256>,
    /// Post-merge randomness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_randao: Option<H256>,
    /// EIP-1559 base fee
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<u64>,
    /// EIP-4844 excess blob gas
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<u64>,
    /// EIP-4844 blob gas used
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<u64>,
    /// EIP-4788 beacon root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<H256>,
    /// EIP-4895 withdrawals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// Blob target handed to the transition tool
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub target_blobs_per_block: Option<u64>,
    /// Header extra data
    pub extra_data: Bytes,
    /// Known ancestor hashes for BLOCKHASH
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub block_hashes: BTreeMap<HexU64, H256>,

    /// Parent difficulty
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub parent_difficulty: Option<U256>,
    /// Parent timestamp
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_timestamp: Option<u64>,
    /// Parent base fee
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_base_fee_per_gas: Option<u64>,
    /// Parent gas used
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_gas_used: Option<u64>,
    /// Parent gas limit
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_gas_limit: Option<u64>,
    /// Parent blob gas used
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_blob_gas_used: Option<u64>,
    /// Parent excess blob gas
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub parent_excess_blob_gas: Option<u64>,
    /// Parent ommers hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ommers_hash: Option<H256>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            fee_recipient: DEFAULT_FEE_RECIPIENT,
            gas_limit: DEFAULT_GAS_LIMIT,
            number: 1,
            timestamp: 1000,
            difficulty: None,
            prev_randao: None,
            base_fee_per_gas: None,
            excess_blob_gas: None,
            blob_gas_used: None,
            parent_beacon_block_root: None,
            withdrawals: None,
            target_blobs_per_block: None,
            extra_data: Bytes::new(),
            block_hashes: BTreeMap::new(),
            parent_difficulty: None,
            parent_timestamp: None,
            parent_base_fee_per_gas: None,
            parent_gas_used: None,
            parent_gas_limit: None,
            parent_blob_gas_used: None,
            parent_excess_blob_gas: None,
            parent_ommers_hash: None,
        }
    }
}

/// Header values of a parent block that seed the child environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentBlock {
    /// Parent hash
    pub hash: H256,
    /// Parent number
    pub number: u64,
    /// Parent timestamp
    pub timestamp: u64,
    /// Parent difficulty
    pub difficulty: U256,
    /// Parent gas limit
    pub gas_limit: u64,
    /// Parent gas used
    pub gas_used: u64,
    /// Parent base fee
    pub base_fee_per_gas: Option<u64>,
    /// Parent blob gas used
    pub blob_gas_used: Option<u64>,
    /// Parent excess blob gas
    pub excess_blob_gas: Option<u64>,
    /// Parent ommers hash
    pub ommers_hash: H256,
}

impl Environment {
    /// Fill every field `fork` requires and clear the ones it forbids.
    ///
    /// Base fee and excess blob gas are derived from the `parent_*` fields when
    /// all inputs are present. Values already set are kept.
    pub fn set_fork_requirements(mut self, fork: Fork) -> Self {
        let required = |field| fork.header_requirement(field) == Requirement::Required;

        if fork.header_prev_randao_required() {
            self.prev_randao.get_or_insert(H256::ZERO);
        }
        if fork.env_difficulty_required() {
            self.difficulty.get_or_insert(U256::from(DEFAULT_DIFFICULTY));
        }

        if required(HeaderField::BaseFee) {
            if self.base_fee_per_gas.is_none() {
                self.base_fee_per_gas = Some(
                    match (
                        self.parent_gas_limit,
                        self.parent_gas_used,
                        self.parent_base_fee_per_gas,
                    ) {
                        (Some(limit), Some(used), Some(fee)) => calc_base_fee(limit, used, fee),
                        _ => DEFAULT_BASE_FEE,
                    },
                );
            }
        } else {
            self.base_fee_per_gas = None;
        }

        if required(HeaderField::WithdrawalsRoot) {
            self.withdrawals.get_or_insert_with(Vec::new);
        } else {
            self.withdrawals = None;
        }

        if required(HeaderField::ExcessBlobGas) {
            if self.excess_blob_gas.is_none() {
                self.excess_blob_gas = Some(
                    match (self.parent_excess_blob_gas, self.parent_blob_gas_used) {
                        (Some(excess), Some(used)) => calc_excess_blob_gas(fork, excess, used),
                        _ => 0,
                    },
                );
            }
            self.blob_gas_used.get_or_insert(0);
            if self.target_blobs_per_block.is_none() {
                self.target_blobs_per_block = fork.blob_schedule().map(|s| s.target);
            }
        } else {
            self.excess_blob_gas = None;
            self.blob_gas_used = None;
            self.target_blobs_per_block = None;
        }

        if required(HeaderField::ParentBeaconBlockRoot) {
            self.parent_beacon_block_root.get_or_insert(H256::ZERO);
        } else {
            self.parent_beacon_block_root = None;
        }

        self
    }

    /// Environment of the child of `parent`.
    ///
    /// Number and timestamp advance, the `parent_*` fields are taken from the
    /// parent, and values derived from them are cleared for recomputation.
    pub fn apply_new_parent(mut self, parent: &ParentBlock) -> Self {
        self.number = parent.number + 1;
        self.timestamp = parent.timestamp + BLOCK_TIME;
        self.parent_difficulty = Some(parent.difficulty);
        self.parent_timestamp = Some(parent.timestamp);
        self.parent_gas_limit = Some(parent.gas_limit);
        self.parent_gas_used = Some(parent.gas_used);
        self.parent_base_fee_per_gas = parent.base_fee_per_gas;
        self.parent_blob_gas_used = parent.blob_gas_used;
        self.parent_excess_blob_gas = parent.excess_blob_gas;
        self.parent_ommers_hash = Some(parent.ommers_hash);
        self.base_fee_per_gas = None;
        self.excess_blob_gas = None;
        self.blob_gas_used = None;
        self.block_hashes.insert(HexU64(parent.number), parent.hash);
        self
    }

    /// Canonical JSON of the fields that decide pre-allocation grouping.
    ///
    /// Fee recipient, prev-randao, timestamp and extra data do not take part.
    pub fn grouping_fingerprint(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return String::new(),
        };
        for key in UNGROUPED_FIELDS {
            value.remove(key);
        }
        serde_json::Value::Object(value).to_string()
    }
}
