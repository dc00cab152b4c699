//! Block assembly from transition tool output

use crate::block::Block;
use crate::error::{BlockError, BlockResult};
use crate::header::{FrozenHeader, Header, EMPTY_OMMERS_HASH};
use fixgen_forks::{Fork, HeaderField, Requirement};
use fixgen_primitives::{Bytes, H256, U256};
use fixgen_tools::TransitionResult;
use fixgen_trie::{ordered_trie_root, EMPTY_TRIE_ROOT};
use fixgen_types::{
    receipts_root, requests_hash, withdrawals_root, Bloom, Environment, Receipt, Transaction,
};

/// Output of [`BlockBuilder::build`]
#[derive(Debug, Clone)]
pub struct BuiltBlock {
    /// Assembled block
    pub block: Block,
    /// Tool receipts of the included transactions
    pub receipts: Vec<Receipt>,
    /// Execution requests, type byte first
    pub requests: Vec<Bytes>,
    /// Indices of the included transactions within the request
    pub included: Vec<usize>,
}

/// Builds one block from an environment and the tool's result
#[derive(Debug, Clone)]
pub struct BlockBuilder<'a> {
    fork: Fork,
    env: &'a Environment,
    parent_hash: H256,
    strict: bool,
}

impl<'a> BlockBuilder<'a> {
    /// Builder for a block executed under `fork` in `env`
    pub fn new(fork: Fork, env: &'a Environment) -> Self {
        Self {
            fork,
            env,
            parent_hash: H256::ZERO,
            strict: false,
        }
    }

    /// Parent block hash
    pub fn parent_hash(mut self, hash: H256) -> Self {
        self.parent_hash = hash;
        self
    }

    /// Fail on forbidden fields instead of dropping them
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn required(&self, field: HeaderField) -> bool {
        self.fork.header_requirement(field) == Requirement::Required
    }

    /// Assemble the block for `txs` as executed in `result`.
    ///
    /// Rejected transactions are left out. Roots the tool reports are checked
    /// against local recomputation.
    pub fn build(&self, txs: &[Transaction], result: &TransitionResult) -> BlockResult<BuiltBlock> {
        let included: Vec<usize> = (0..txs.len())
            .filter(|i| result.rejection(*i).is_none())
            .collect();
        let transactions: Vec<Transaction> = included.iter().map(|i| txs[*i].clone()).collect();

        let blob_gas_used = if self.required(HeaderField::BlobGasUsed) {
            let computed: u64 = transactions.iter().map(|tx| tx.blob_gas(self.fork)).sum();
            if let Some(tool) = result.blob_gas_used {
                if tool != computed {
                    return Err(BlockError::BlobGasUsedMismatch { tool, computed });
                }
            }
            Some(computed)
        } else {
            None
        };

        let computed_receipts_root = receipts_root(&result.receipts);
        if computed_receipts_root != result.receipts_root {
            return Err(BlockError::ReceiptsRootMismatch {
                tool: result.receipts_root,
                computed: computed_receipts_root,
            });
        }

        let requests = result.requests.clone().unwrap_or_default();
        let requests_hash = if self.required(HeaderField::RequestsHash) {
            let computed = requests_hash(&requests);
            if let Some(tool) = result.requests_hash {
                if tool != computed {
                    return Err(BlockError::RequestsHashMismatch { tool, computed });
                }
            }
            Some(computed)
        } else {
            None
        };

        let encoded = transactions
            .iter()
            .map(Transaction::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let transactions_root = ordered_trie_root(encoded);
        if let Some(tool) = result.tx_root {
            if tool != transactions_root {
                tracing::warn!(%tool, computed = %transactions_root, "tool reported a different transactions root");
            }
        }

        let env = self.env;
        let header = Header {
            parent_hash: self.parent_hash,
            ommers_hash: EMPTY_OMMERS_HASH,
            fee_recipient: env.fee_recipient,
            state_root: result.state_root,
            transactions_root,
            receipts_root: computed_receipts_root,
            logs_bloom: result.logs_bloom.clone(),
            difficulty: self.difficulty(result.difficulty),
            number: env.number,
            gas_limit: env.gas_limit,
            gas_used: result.gas_used,
            timestamp: env.timestamp,
            extra_data: env.extra_data.clone(),
            mix_hash: self.mix_hash(),
            nonce: 0,
            base_fee_per_gas: result.base_fee_per_gas.or(env.base_fee_per_gas),
            withdrawals_root: env.withdrawals.as_deref().map(withdrawals_root),
            blob_gas_used,
            excess_blob_gas: result.excess_blob_gas.or(env.excess_blob_gas),
            parent_beacon_block_root: env.parent_beacon_block_root,
            requests_hash,
        };
        let frozen = FrozenHeader::build(header, self.fork, self.strict)?;
        tracing::debug!(
            fork = %self.fork,
            number = env.number,
            hash = %frozen.hash(),
            txs = transactions.len(),
            "built block"
        );

        let block = Block {
            header: frozen,
            transactions,
            ommers: Vec::new(),
            withdrawals: env.withdrawals.clone(),
        };
        Ok(BuiltBlock {
            block,
            receipts: result.receipts.clone(),
            requests,
            included,
        })
    }

    fn difficulty(&self, tool: Option<U256>) -> U256 {
        if self.fork.header_zero_difficulty_required() {
            U256::zero()
        } else {
            tool.or(self.env.difficulty).unwrap_or_default()
        }
    }

    fn mix_hash(&self) -> H256 {
        if self.fork.header_prev_randao_required() {
            self.env.prev_randao.unwrap_or_default()
        } else {
            H256::ZERO
        }
    }

    /// Genesis header over a pre-state with root `state_root`
    pub fn genesis(&self, state_root: H256) -> BlockResult<FrozenHeader> {
        let env = self.env;
        let header = Header {
            parent_hash: H256::ZERO,
            ommers_hash: EMPTY_OMMERS_HASH,
            fee_recipient: env.fee_recipient,
            state_root,
            transactions_root: EMPTY_TRIE_ROOT,
            receipts_root: EMPTY_TRIE_ROOT,
            logs_bloom: Bloom::ZERO,
            difficulty: self.difficulty(None),
            number: env.number,
            gas_limit: env.gas_limit,
            gas_used: 0,
            timestamp: env.timestamp,
            extra_data: env.extra_data.clone(),
            mix_hash: self.mix_hash(),
            nonce: 0,
            base_fee_per_gas: env.base_fee_per_gas,
            withdrawals_root: self
                .required(HeaderField::WithdrawalsRoot)
                .then_some(EMPTY_TRIE_ROOT),
            blob_gas_used: self.required(HeaderField::BlobGasUsed).then_some(0),
            excess_blob_gas: env.excess_blob_gas,
            parent_beacon_block_root: env.parent_beacon_block_root,
            requests_hash: self
                .required(HeaderField::RequestsHash)
                .then(|| requests_hash(&[])),
        };
        FrozenHeader::build(header, self.fork, self.strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_tools::RejectedTx;

    fn result(receipts: Vec<Receipt>) -> TransitionResult {
        TransitionResult {
            state_root: H256::from_low_u64(1),
            tx_root: None,
            receipts_root: receipts_root(&receipts),
            logs_hash: H256::ZERO,
            logs_bloom: Bloom::ZERO,
            receipts,
            rejected: vec![],
            difficulty: None,
            gas_used: 21_000,
            base_fee_per_gas: None,
            excess_blob_gas: None,
            blob_gas_used: None,
            withdrawals_root: None,
            requests: None,
            requests_hash: None,
        }
    }

    fn receipt() -> Receipt {
        Receipt {
            status: Some(1),
            cumulative_gas_used: 21_000,
            gas_used: 21_000,
            ..Default::default()
        }
    }

    fn txs() -> Vec<Transaction> {
        vec![
            Transaction::default().sign().unwrap(),
            Transaction {
                nonce: 1,
                ..Default::default()
            }
            .sign()
            .unwrap(),
        ]
    }

    // ==================== Build ====================

    #[test]
    fn test_rejected_excluded() {
        let env = Environment::default().set_fork_requirements(Fork::Shanghai);
        let mut res = result(vec![receipt()]);
        res.rejected.push(RejectedTx {
            index: 1,
            error: "nonce too high".into(),
        });
        let built = BlockBuilder::new(Fork::Shanghai, &env).build(&txs(), &res).unwrap();
        assert_eq!(built.included, vec![0]);
        assert_eq!(built.block.transactions.len(), 1);
        let header = built.block.header.header();
        assert_eq!(header.withdrawals_root, Some(EMPTY_TRIE_ROOT));
        assert_eq!(header.base_fee_per_gas, env.base_fee_per_gas);
        assert_eq!(header.difficulty, U256::zero());
        assert_ne!(header.transactions_root, EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_receipts_root_mismatch() {
        let env = Environment::default().set_fork_requirements(Fork::Shanghai);
        let mut res = result(vec![receipt()]);
        res.receipts_root = H256::from_low_u64(9);
        assert!(matches!(
            BlockBuilder::new(Fork::Shanghai, &env).build(&txs()[..1], &res),
            Err(BlockError::ReceiptsRootMismatch { .. })
        ));
    }

    #[test]
    fn test_blob_gas_divergence_is_fatal() {
        let env = Environment::default().set_fork_requirements(Fork::Cancun);
        let mut res = result(vec![receipt()]);
        res.blob_gas_used = Some(131_072);
        assert!(matches!(
            BlockBuilder::new(Fork::Cancun, &env).build(&txs()[..1], &res),
            Err(BlockError::BlobGasUsedMismatch { tool: 131_072, computed: 0 })
        ));
    }

    #[test]
    fn test_requests_hash_checked() {
        let env = Environment::default().set_fork_requirements(Fork::Prague);
        let mut res = result(vec![receipt()]);
        res.requests = Some(vec![Bytes::from(vec![0x00, 0x01])]);
        res.requests_hash = Some(requests_hash(&[]));
        assert!(matches!(
            BlockBuilder::new(Fork::Prague, &env).build(&txs()[..1], &res),
            Err(BlockError::RequestsHashMismatch { .. })
        ));

        res.requests_hash = None;
        let built = BlockBuilder::new(Fork::Prague, &env).build(&txs()[..1], &res).unwrap();
        assert_eq!(
            built.block.header.header().requests_hash,
            Some(requests_hash(&[Bytes::from(vec![0x00, 0x01])]))
        );
    }

    // ==================== Genesis ====================

    #[test]
    fn test_genesis_fields_follow_fork() {
        for fork in [Fork::Berlin, Fork::London, Fork::Shanghai, Fork::Cancun, Fork::Prague] {
            let env = Environment {
                number: 0,
                ..Default::default()
            }
            .set_fork_requirements(fork);
            let genesis = BlockBuilder::new(fork, &env).strict(true).genesis(H256::ZERO).unwrap();
            assert_eq!(genesis.header().number, 0);
            assert_eq!(genesis.header().base_fee_per_gas.is_some(), fork >= Fork::London);
            assert_eq!(genesis.header().requests_hash.is_some(), fork >= Fork::Prague);
        }
    }
}
