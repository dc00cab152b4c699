//! Multi-block chains: genesis, per-block execution and fixture rendering

use crate::context::FillContext;
use crate::error::{SpecError, SpecResult};
use crate::reconcile::{check_receipts, reconcile_transactions};
use crate::spec::{BlockSpec, BlockchainTestSpec};
use fixgen_block::{
    Block, BlockBuilder, FixtureBlockEntry, FixtureEngineNewPayload, FrozenHeader,
    InvalidFixtureBlock,
};
use fixgen_exceptions::ExceptionList;
use fixgen_fixtures::{
    BlockchainEngineFixture, BlockchainFixture, FixtureConfig, FixtureInfo, SEAL_ENGINE,
};
use fixgen_forks::{Fork, Network};
use fixgen_primitives::{Bytes, H256};
use fixgen_tools::TransitionRequest;
use fixgen_trie::ordered_trie_root;
use fixgen_types::{Alloc, Environment, ParentBlock, Transaction, TypesResult};

/// One generated block and what the fixture says about it
#[derive(Debug, Clone)]
pub struct ChainBlock {
    /// The block as built, patched when the spec asks for it
    pub block: Block,
    /// Execution requests, type byte first
    pub requests: Vec<Bytes>,
    /// Exceptions a client must reject the block with
    pub exception: Option<ExceptionList>,
    /// Raw RLP replacing the built block's
    pub rlp: Option<Bytes>,
    /// Engine API error code
    pub engine_error_code: Option<i64>,
}

/// A generated chain
#[derive(Debug, Clone)]
pub struct GeneratedChain {
    /// Network the chain runs on
    pub network: Network,
    /// Genesis environment after fork defaults
    pub genesis_environment: Environment,
    /// Genesis block
    pub genesis: Block,
    /// Genesis pre-state
    pub pre: Alloc,
    /// Blocks in import order, invalid ones included
    pub blocks: Vec<ChainBlock>,
    /// State after the last valid block
    pub post: Alloc,
    /// Hash of the last valid block
    pub head: H256,
}

fn parent_of(header: &FrozenHeader) -> ParentBlock {
    let h = header.header();
    ParentBlock {
        hash: header.hash(),
        number: h.number,
        timestamp: h.timestamp,
        difficulty: h.difficulty,
        gas_limit: h.gas_limit,
        gas_used: h.gas_used,
        base_fee_per_gas: h.base_fee_per_gas,
        blob_gas_used: h.blob_gas_used,
        excess_blob_gas: h.excess_blob_gas,
        ommers_hash: h.ommers_hash,
    }
}

fn block_environment(template: &Environment, parent: &ParentBlock, spec: &BlockSpec) -> Environment {
    let mut env = template.clone().apply_new_parent(parent);
    if let Some(timestamp) = spec.timestamp {
        env.timestamp = timestamp;
    }
    if let Some(fee_recipient) = spec.fee_recipient {
        env.fee_recipient = fee_recipient;
    }
    if let Some(extra_data) = &spec.extra_data {
        env.extra_data = extra_data.clone();
    }
    if spec.prev_randao.is_some() {
        env.prev_randao = spec.prev_randao;
    }
    if spec.parent_beacon_block_root.is_some() {
        env.parent_beacon_block_root = spec.parent_beacon_block_root;
    }
    env.withdrawals = spec.withdrawals.clone();
    env
}

/// Rebuild `block` with every transaction in its body.
fn include_all(block: Block, txs: &[Transaction], strict: bool) -> SpecResult<Block> {
    let encoded = txs
        .iter()
        .map(Transaction::encode)
        .collect::<TypesResult<Vec<_>>>()?;
    let fork = block.header.fork();
    let mut header = block.header.into_header();
    header.transactions_root = ordered_trie_root(encoded);
    Ok(Block {
        header: FrozenHeader::build(header, fork, strict)?,
        transactions: txs.to_vec(),
        ..block
    })
}

/// Execute every block of `spec` on `network`.
///
/// Valid blocks advance the state. An invalid block is built on the current
/// head and then dropped, so the next block builds on the same parent.
pub fn generate_chain(
    ctx: &FillContext,
    network: Network,
    spec: &BlockchainTestSpec,
) -> SpecResult<GeneratedChain> {
    let genesis_fork = network.genesis_fork();
    let genesis_environment = spec
        .genesis_environment
        .clone()
        .set_fork_requirements(genesis_fork);
    let genesis_header = BlockBuilder::new(genesis_fork, &genesis_environment)
        .strict(ctx.strict)
        .genesis(spec.pre.state_root())?;
    let genesis = Block {
        transactions: Vec::new(),
        ommers: Vec::new(),
        withdrawals: genesis_header.header().withdrawals_root.map(|_| Vec::new()),
        header: genesis_header,
    };
    tracing::debug!(network = network.name(), hash = %genesis.hash(), "genesis built");

    let mut template = genesis_environment.clone();
    let mut parent = parent_of(&genesis.header);
    let mut alloc = spec.pre.clone();
    let mut blocks = Vec::with_capacity(spec.blocks.len());

    for (position, block_spec) in spec.blocks.iter().enumerate() {
        let env = block_environment(&template, &parent, block_spec);
        let fork = network.fork_at(env.number, env.timestamp);
        let env = env.set_fork_requirements(fork);

        if block_spec.rlp.is_some() && !block_spec.is_invalid() {
            return Err(SpecError::InvalidSpec(format!(
                "block {}: raw rlp requires an expected exception",
                position + 1
            )));
        }

        let txs = block_spec
            .txs
            .iter()
            .cloned()
            .map(Transaction::sign)
            .collect::<TypesResult<Vec<_>>>()?;
        tracing::debug!(%fork, number = env.number, txs = txs.len(), "executing block");

        let request = TransitionRequest::new(alloc.clone(), txs.clone(), env.clone(), fork, ctx.chain_id);
        let output = ctx.t8n().evaluate(&request)?;
        reconcile_transactions(ctx.t8n_mapper(), &txs, &output.result)?;

        let built = BlockBuilder::new(fork, &env)
            .parent_hash(parent.hash)
            .strict(ctx.strict)
            .build(&txs, &output.result)?;
        check_receipts(&txs, &built.included, &built.receipts)?;

        let mut block = built.block;
        if block_spec.is_invalid() && built.included.len() < txs.len() {
            // the rejected transactions are what makes the block invalid
            block = include_all(block, &txs, ctx.strict)?;
        }
        block.header = block.header.apply(&block_spec.header_patch, ctx.strict)?;
        if let Some(expected) = &block_spec.header_verify {
            expected.verify(block.header.header())?;
        }

        if !block_spec.is_invalid() {
            alloc = output.alloc;
            parent = parent_of(&block.header);
            template.block_hashes = env.block_hashes.clone();
        } else {
            tracing::debug!(number = env.number, "invalid block kept off the chain");
        }

        blocks.push(ChainBlock {
            block,
            requests: built.requests,
            exception: block_spec.exception.clone(),
            rlp: block_spec.rlp.clone(),
            engine_error_code: block_spec.engine_error_code,
        });
    }

    spec.post.verify(&alloc)?;

    Ok(GeneratedChain {
        network,
        genesis_environment,
        genesis,
        pre: spec.pre.clone(),
        blocks,
        post: alloc,
        head: parent.hash,
    })
}

impl GeneratedChain {
    /// `blockchain_test` rendering
    pub fn to_blockchain_fixture(&self, chain_id: u64, info: FixtureInfo) -> SpecResult<BlockchainFixture> {
        let blocks = self
            .blocks
            .iter()
            .map(|b| -> SpecResult<FixtureBlockEntry> {
                Ok(match (&b.exception, &b.rlp) {
                    (Some(exception), Some(rlp)) => FixtureBlockEntry::Invalid(InvalidFixtureBlock {
                        rlp: rlp.clone(),
                        expect_exception: exception.clone(),
                        rlp_decoded: None,
                    }),
                    (Some(exception), None) => {
                        FixtureBlockEntry::Invalid(b.block.to_invalid_fixture(exception.clone())?)
                    }
                    (None, _) => FixtureBlockEntry::Valid(b.block.to_fixture()?),
                })
            })
            .collect::<SpecResult<Vec<_>>>()?;

        Ok(BlockchainFixture {
            network: self.network.name().to_string(),
            genesis_block_header: self.genesis.header.to_fixture(),
            genesis_rlp: Bytes::from(self.genesis.rlp()?),
            blocks,
            last_block_hash: self.head,
            pre: self.pre.clone(),
            post_state: Some(self.post.clone()),
            post_state_hash: None,
            seal_engine: SEAL_ENGINE.to_string(),
            config: FixtureConfig::new(self.network.latest_fork(), chain_id),
            info,
        })
    }

    /// `blockchain_test_engine` rendering.
    ///
    /// Needs a post-merge genesis. Raw RLP blocks have no payload form.
    pub fn to_engine_fixture(&self, chain_id: u64, info: FixtureInfo) -> SpecResult<BlockchainEngineFixture> {
        let genesis_fork = self.network.genesis_fork();
        if !genesis_fork.is_at_least(Fork::Paris) {
            return Err(SpecError::UnsupportedFork {
                spec: "BlockchainTestEngine",
                fork: genesis_fork,
                reason: "the engine API starts at Paris".into(),
            });
        }
        if self.blocks.iter().any(|b| b.rlp.is_some()) {
            return Err(SpecError::UnsupportedFormat {
                spec: "BlockchainTest",
                format: fixgen_fixtures::FixtureFormat::BlockchainTestEngine,
            });
        }

        let engine_new_payloads = self
            .blocks
            .iter()
            .map(|b| {
                FixtureEngineNewPayload::from_block(
                    &b.block,
                    &b.requests,
                    b.exception.clone(),
                    b.engine_error_code,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BlockchainEngineFixture {
            network: self.network.name().to_string(),
            genesis_block_header: self.genesis.header.to_fixture(),
            engine_new_payloads,
            last_block_hash: self.head,
            pre: self.pre.clone(),
            post_state: Some(self.post.clone()),
            post_state_hash: None,
            config: FixtureConfig::new(self.network.latest_fork(), chain_id),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_primitives::Address;

    fn parent() -> ParentBlock {
        ParentBlock {
            hash: H256::from_low_u64(0xaa),
            number: 4,
            timestamp: 48,
            difficulty: Default::default(),
            gas_limit: 30_000_000,
            gas_used: 15_000_000,
            base_fee_per_gas: Some(1_000),
            blob_gas_used: None,
            excess_blob_gas: None,
            ommers_hash: H256::ZERO,
        }
    }

    // ==================== Environment ====================

    #[test]
    fn test_block_environment_overrides() {
        let template = Environment {
            fee_recipient: Address::from_low_u64(1),
            ..Default::default()
        };
        let spec = BlockSpec {
            timestamp: Some(100),
            fee_recipient: Some(Address::from_low_u64(2)),
            ..Default::default()
        };
        let env = block_environment(&template, &parent(), &spec);
        assert_eq!(env.number, 5);
        assert_eq!(env.timestamp, 100);
        assert_eq!(env.fee_recipient, Address::from_low_u64(2));
        assert_eq!(env.parent_base_fee_per_gas, Some(1_000));
        assert_eq!(env.withdrawals, None);
    }

    #[test]
    fn test_block_environment_inherits() {
        let template = Environment {
            fee_recipient: Address::from_low_u64(1),
            ..Default::default()
        };
        let env = block_environment(&template, &parent(), &BlockSpec::default());
        assert_eq!(env.timestamp, 60);
        assert_eq!(env.fee_recipient, Address::from_low_u64(1));
        // base fee is derived again from the parent
        let env = env.set_fork_requirements(Fork::Shanghai);
        assert_eq!(env.base_fee_per_gas, Some(1_000));
    }
}
