//! Engine API `newPayload` parameters built from blocks

use crate::block::Block;
use crate::error::{BlockError, BlockResult};
use fixgen_exceptions::ExceptionList;
use fixgen_primitives::serde_hex::{minimal_u64, opt_minimal_u64};
use fixgen_primitives::{Address, Bytes, H256};
use fixgen_types::{Bloom, Withdrawal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Withdrawal in engine form, quantities in minimal hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineWithdrawal {
    #[serde(with = "minimal_u64")]
    index: u64,
    #[serde(with = "minimal_u64")]
    validator_index: u64,
    address: Address,
    #[serde(with = "minimal_u64")]
    amount: u64,
}

impl From<&Withdrawal> for EngineWithdrawal {
    fn from(w: &Withdrawal) -> Self {
        Self {
            index: w.index,
            validator_index: w.validator_index,
            address: w.address,
            amount: w.amount,
        }
    }
}

/// `ExecutionPayload` V1 to V3. V4 adds no payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayload {
    /// Parent hash
    pub parent_hash: H256,
    /// Coinbase
    pub fee_recipient: Address,
    /// State root
    pub state_root: H256,
    /// Receipts root
    pub receipts_root: H256,
    /// Logs bloom
    pub logs_bloom: Bloom,
    /// Block number
    #[serde(with = "minimal_u64")]
    pub block_number: u64,
    /// Gas limit
    #[serde(with = "minimal_u64")]
    pub gas_limit: u64,
    /// Gas used
    #[serde(with = "minimal_u64")]
    pub gas_used: u64,
    /// Timestamp
    #[serde(with = "minimal_u64")]
    pub timestamp: u64,
    /// Extra data
    pub extra_data: Bytes,
    /// Prev-randao
    pub prev_randao: H256,
    /// Base fee
    #[serde(with = "minimal_u64")]
    pub base_fee_per_gas: u64,
    /// Block hash
    pub block_hash: H256,
    /// Network-encoded transactions
    pub transactions: Vec<Bytes>,
    /// V2+
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Vec<EngineWithdrawal>>,
    /// V3+
    #[serde(default, with = "opt_minimal_u64", skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<u64>,
    /// V3+
    #[serde(default, with = "opt_minimal_u64", skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<u64>,
}

impl ExecutionPayload {
    /// Payload of `block`
    pub fn from_block(block: &Block) -> BlockResult<Self> {
        let header = block.header.header();
        Ok(Self {
            parent_hash: header.parent_hash,
            fee_recipient: header.fee_recipient,
            state_root: header.state_root,
            receipts_root: header.receipts_root,
            logs_bloom: header.logs_bloom.clone(),
            block_number: header.number,
            gas_limit: header.gas_limit,
            gas_used: header.gas_used,
            timestamp: header.timestamp,
            extra_data: header.extra_data.clone(),
            prev_randao: header.mix_hash,
            base_fee_per_gas: header.base_fee_per_gas.unwrap_or_default(),
            block_hash: block.hash(),
            transactions: block
                .transactions
                .iter()
                .map(|tx| tx.encode().map(Bytes::from))
                .collect::<Result<_, _>>()?,
            withdrawals: block
                .withdrawals
                .as_ref()
                .map(|ws| ws.iter().map(EngineWithdrawal::from).collect()),
            blob_gas_used: header.blob_gas_used,
            excess_blob_gas: header.excess_blob_gas,
        })
    }
}

/// One `engine_newPayload` call in an engine fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureEngineNewPayload {
    /// Positional call parameters
    pub params: Vec<Value>,
    /// `engine_newPayloadV<n>`
    pub new_payload_version: String,
    /// `engine_forkchoiceUpdatedV<n>`
    pub forkchoice_updated_version: String,
    /// Reasons the client must answer `INVALID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<ExceptionList>,
    /// JSON-RPC error code the client must answer with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl FixtureEngineNewPayload {
    /// Call for `block`. `requests` are the block's execution requests,
    /// type byte first.
    pub fn from_block(
        block: &Block,
        requests: &[Bytes],
        validation_error: Option<ExceptionList>,
        error_code: Option<i64>,
    ) -> BlockResult<Self> {
        let fork = block.header.fork();
        let new_payload_version = fork
            .engine_new_payload_version()
            .ok_or(BlockError::EngineUnsupported(fork))?;
        let forkchoice_updated_version = fork
            .engine_forkchoice_updated_version()
            .ok_or(BlockError::EngineUnsupported(fork))?;

        let mut params = vec![serde_json::to_value(ExecutionPayload::from_block(block)?)?];
        if fork.engine_new_payload_blob_hashes() {
            let hashes: Vec<H256> = block
                .transactions
                .iter()
                .flat_map(|tx| tx.blob_versioned_hashes.iter().flatten().copied())
                .collect();
            params.push(serde_json::to_value(hashes)?);
        }
        if fork.engine_new_payload_beacon_root() {
            let root = block.header.header().parent_beacon_block_root.unwrap_or_default();
            params.push(serde_json::to_value(root)?);
        }
        if fork.engine_new_payload_requests() {
            let requests: Vec<&Bytes> = requests.iter().filter(|r| r.len() > 1).collect();
            params.push(serde_json::to_value(requests)?);
        }

        Ok(Self {
            params,
            new_payload_version: new_payload_version.to_string(),
            forkchoice_updated_version: forkchoice_updated_version.to_string(),
            validation_error,
            error_code: error_code.map(|c| c.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FrozenHeader, Header};
    use fixgen_forks::Fork;
    use fixgen_types::Transaction;

    fn block(fork: Fork, header: Header) -> Block {
        Block {
            header: FrozenHeader::build(header, fork, false).unwrap(),
            transactions: vec![Transaction::default().sign().unwrap()],
            ommers: vec![],
            withdrawals: fork.is_at_least(Fork::Shanghai).then(Vec::new),
        }
    }

    fn cancun_header() -> Header {
        Header {
            number: 1,
            base_fee_per_gas: Some(7),
            withdrawals_root: Some(fixgen_trie::EMPTY_TRIE_ROOT),
            blob_gas_used: Some(0),
            excess_blob_gas: Some(0),
            parent_beacon_block_root: Some(H256::ZERO),
            ..Default::default()
        }
    }

    #[test]
    fn test_params_per_fork() {
        let shanghai = Header {
            blob_gas_used: None,
            excess_blob_gas: None,
            parent_beacon_block_root: None,
            ..cancun_header()
        };
        let call = FixtureEngineNewPayload::from_block(&block(Fork::Shanghai, shanghai), &[], None, None).unwrap();
        assert_eq!(call.params.len(), 1);
        assert_eq!(call.new_payload_version, "2");

        let call = FixtureEngineNewPayload::from_block(&block(Fork::Cancun, cancun_header()), &[], None, None).unwrap();
        assert_eq!(call.params.len(), 3);
        assert_eq!(call.params[0]["blockNumber"], "0x1");
        assert_eq!(call.params[0]["blobGasUsed"], "0x0");
        assert_eq!(call.params[1], serde_json::json!([]));
    }

    #[test]
    fn test_requests_filtered() {
        let header = Header {
            requests_hash: Some(fixgen_types::requests_hash(&[])),
            ..cancun_header()
        };
        let requests = vec![Bytes::from(vec![0x00]), Bytes::from(vec![0x01, 0xaa])];
        let call = FixtureEngineNewPayload::from_block(&block(Fork::Prague, header), &requests, None, Some(-32602))
            .unwrap();
        assert_eq!(call.params.len(), 4);
        assert_eq!(call.params[3], serde_json::json!(["0x01aa"]));
        assert_eq!(call.error_code.as_deref(), Some("-32602"));
    }

    #[test]
    fn test_pre_merge_unsupported() {
        let header = Header {
            number: 1,
            base_fee_per_gas: Some(7),
            ..Default::default()
        };
        assert!(matches!(
            FixtureEngineNewPayload::from_block(&block(Fork::London, header), &[], None, None),
            Err(BlockError::EngineUnsupported(Fork::London))
        ));
    }
}
