//! Transition tool contract

use crate::error::ToolResult;
use fixgen_forks::Fork;
use fixgen_primitives::number::{minimal_hex_u256, minimal_hex_u64};
use fixgen_primitives::serde_hex::{opt_padded_u256, opt_padded_u64, padded_u64};
use fixgen_primitives::{Bytes, H256, U256};
use fixgen_types::{Alloc, Bloom, Environment, Receipt, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One block worth of work for the transition tool
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    /// Pre-state
    pub alloc: Alloc,
    /// Signed transactions
    pub txs: Vec<Transaction>,
    /// Block environment with fork defaults applied
    pub env: Environment,
    /// Fork the block executes under
    pub fork: Fork,
    /// Chain id
    pub chain_id: u64,
    /// Mining reward in wei
    pub reward: u128,
}

impl TransitionRequest {
    /// Request with the fork's block reward
    pub fn new(alloc: Alloc, txs: Vec<Transaction>, env: Environment, fork: Fork, chain_id: u64) -> Self {
        Self {
            alloc,
            txs,
            env,
            fork,
            chain_id,
            reward: fork.block_reward(),
        }
    }
}

/// Transaction the tool refused to include
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTx {
    /// Position in the request
    #[serde(with = "padded_u64")]
    pub index: u64,
    /// Raw tool message
    pub error: String,
}

/// The `result` object of the tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    /// Post-state root
    pub state_root: H256,
    /// Transactions root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_root: Option<H256>,
    /// Receipts root
    pub receipts_root: H256,
    /// keccak256 of the RLP of all logs
    pub logs_hash: H256,
    /// Aggregate bloom
    pub logs_bloom: Bloom,
    /// One receipt per included transaction
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    /// Transactions left out of the block
    #[serde(default)]
    pub rejected: Vec<RejectedTx>,
    /// Difficulty computed by the tool
    #[serde(rename = "currentDifficulty", default, with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<U256>,
    /// Gas used by the block
    #[serde(with = "padded_u64")]
    pub gas_used: u64,
    /// Base fee computed by the tool
    #[serde(rename = "currentBaseFee", default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<u64>,
    /// Excess blob gas computed by the tool
    #[serde(rename = "currentExcessBlobGas", default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<u64>,
    /// Blob gas used by the block
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<u64>,
    /// Withdrawals root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<H256>,
    /// Execution requests, type byte first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<Vec<Bytes>>,
    /// Requests hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_hash: Option<H256>,
}

impl TransitionResult {
    /// Raw rejection message of the transaction at `index`
    pub fn rejection(&self, index: usize) -> Option<&str> {
        self.rejected
            .iter()
            .find(|r| r.index as usize == index)
            .map(|r| r.error.as_str())
    }
}

/// Complete tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutput {
    /// Post-state
    pub alloc: Alloc,
    /// Block result
    pub result: TransitionResult,
}

/// Executes one block against a pre-state
pub trait TransitionTool: Send + Sync {
    /// Short name, used in logs and for the exception mapper
    fn name(&self) -> &str;

    /// Version string recorded in fixture `_info`
    fn version(&self) -> String;

    /// Run the transition
    fn evaluate(&self, request: &TransitionRequest) -> ToolResult<TransitionOutput>;
}

/// Environment object in the tool's input dialect, quantities in minimal hex
pub fn t8n_env(env: &Environment, fork: Fork) -> Value {
    let mut m = Map::new();
    let mut put = |key: &str, value: Value| {
        m.insert(key.to_string(), value);
    };
    let q = |v: u64| Value::String(minimal_hex_u64(v));
    let q256 = |v: &U256| Value::String(minimal_hex_u256(v));

    put("currentCoinbase", json!(env.fee_recipient));
    put("currentGasLimit", q(env.gas_limit));
    put("currentNumber", q(env.number));
    put("currentTimestamp", q(env.timestamp));
    if let Some(d) = &env.difficulty {
        put("currentDifficulty", q256(d));
    }
    if let Some(r) = &env.prev_randao {
        put("currentRandom", json!(r));
    }
    if let Some(v) = env.base_fee_per_gas {
        put("currentBaseFee", q(v));
    }
    if let Some(v) = env.excess_blob_gas {
        put("currentExcessBlobGas", q(v));
    }
    if let Some(v) = env.blob_gas_used {
        put("currentBlobGasUsed", q(v));
    }
    if let Some(root) = &env.parent_beacon_block_root {
        put("parentBeaconBlockRoot", json!(root));
    }
    if let Some(withdrawals) = &env.withdrawals {
        let list: Vec<Value> = withdrawals
            .iter()
            .map(|w| {
                json!({
                    "index": q(w.index),
                    "validatorIndex": q(w.validator_index),
                    "address": w.address,
                    "amount": q(w.amount),
                })
            })
            .collect();
        put("withdrawals", Value::Array(list));
    }
    if !env.block_hashes.is_empty() {
        let hashes: Map<String, Value> = env
            .block_hashes
            .iter()
            .map(|(n, h)| (minimal_hex_u64(n.0), json!(h)))
            .collect();
        put("blockHashes", Value::Object(hashes));
    }
    if let Some(v) = &env.parent_difficulty {
        put("parentDifficulty", q256(v));
    }
    if let Some(v) = env.parent_timestamp {
        put("parentTimestamp", q(v));
    }
    if let Some(v) = env.parent_base_fee_per_gas {
        put("parentBaseFee", q(v));
    }
    if let Some(v) = env.parent_gas_used {
        put("parentGasUsed", q(v));
    }
    if let Some(v) = env.parent_gas_limit {
        put("parentGasLimit", q(v));
    }
    if let Some(v) = env.parent_blob_gas_used {
        put("parentBlobGasUsed", q(v));
    }
    if let Some(v) = env.parent_excess_blob_gas {
        put("parentExcessBlobGas", q(v));
    }
    if let Some(h) = &env.parent_ommers_hash {
        put("parentUncleHash", json!(h));
    }
    let schedule = fork.blob_schedule_table();
    if !schedule.is_empty() {
        let table: Map<String, Value> = schedule
            .into_iter()
            .map(|(name, s)| (name.to_string(), json!(s)))
            .collect();
        put("blobSchedule", Value::Object(table));
    }
    Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_uses_minimal_hex() {
        let env = Environment::default().set_fork_requirements(Fork::Cancun);
        let v = t8n_env(&env, Fork::Cancun);
        assert_eq!(v["currentNumber"], "0x1");
        assert_eq!(v["currentBaseFee"], "0x7");
        assert_eq!(v["currentExcessBlobGas"], "0x0");
        assert!(v.get("currentDifficulty").is_none());
        assert!(v["blobSchedule"].get("Cancun").is_some());
        assert_eq!(v["withdrawals"], json!([]));
    }

    #[test]
    fn test_env_before_blobs() {
        let env = Environment::default().set_fork_requirements(Fork::London);
        let v = t8n_env(&env, Fork::London);
        assert!(v.get("blobSchedule").is_none());
        assert!(v.get("currentDifficulty").is_some());
    }

    #[test]
    fn test_result_parses_tool_output() {
        let raw = json!({
            "stateRoot": format!("0x{}", "11".repeat(32)),
            "receiptsRoot": format!("0x{}", "22".repeat(32)),
            "logsHash": format!("0x{}", "33".repeat(32)),
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "receipts": [],
            "rejected": [{ "index": 1, "error": "nonce too low" }],
            "gasUsed": "0x5208",
            "currentBaseFee": "0x7",
        });
        let result: TransitionResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.gas_used, 21000);
        assert_eq!(result.base_fee_per_gas, Some(7));
        assert_eq!(result.rejection(1), Some("nonce too low"));
        assert_eq!(result.rejection(0), None);
    }
}
