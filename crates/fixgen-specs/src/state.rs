//! Single-transaction tests and their blockchain lowering

use crate::context::FillContext;
use crate::error::{SpecError, SpecResult};
use crate::reconcile::{check_receipts, reconcile_transactions};
use crate::spec::{BlockSpec, BlockchainTestSpec, StateTestSpec};
use fixgen_fixtures::{
    FixtureConfig, FixtureEnvironment, FixtureInfo, StateFixture, StateFixtureTransaction,
    StateIndexes, StatePost,
};
use fixgen_forks::{Fork, Network};
use fixgen_primitives::Bytes;
use fixgen_tools::TransitionRequest;
use fixgen_types::Environment;
use std::collections::BTreeMap;

/// The fork of a single-fork network; transitions are rejected for `spec`.
pub(crate) fn single_fork(spec: &'static str, network: Network) -> SpecResult<Fork> {
    match network {
        Network::Fork(fork) => Ok(fork),
        Network::Transition(t) => Err(SpecError::UnsupportedFork {
            spec,
            fork: t.to(),
            reason: format!("{} is a transition network", t.name()),
        }),
    }
}

/// Fill a `state_test` fixture: one transaction against the pre-state.
pub fn fill_state_test(
    ctx: &FillContext,
    network: Network,
    spec: &StateTestSpec,
    info: FixtureInfo,
) -> SpecResult<StateFixture> {
    let fork = single_fork("StateTest", network)?;
    let env = spec.env.clone().set_fork_requirements(fork);
    let tx = spec.tx.clone().sign()?;

    let request = TransitionRequest::new(spec.pre.clone(), vec![tx.clone()], env.clone(), fork, ctx.chain_id);
    let output = ctx.t8n().evaluate(&request)?;
    let txs = std::slice::from_ref(&tx);
    reconcile_transactions(ctx.t8n_mapper(), txs, &output.result)?;
    if output.result.rejection(0).is_none() {
        check_receipts(txs, &[0], &output.result.receipts)?;
    }
    spec.post.verify(&output.alloc)?;

    let local_root = output.alloc.state_root();
    if local_root != output.result.state_root {
        tracing::warn!(tool = %output.result.state_root, computed = %local_root, "state root differs from the returned alloc");
    }

    let post = StatePost {
        hash: output.result.state_root,
        logs: output.result.logs_hash,
        txbytes: Bytes::from(tx.encode()?),
        indexes: StateIndexes::default(),
        state: output.alloc,
        expect_exception: tx.error.clone(),
    };

    Ok(StateFixture {
        env: FixtureEnvironment::from(&env),
        pre: spec.pre.clone(),
        transaction: StateFixtureTransaction::from_signed(&tx)?,
        post: BTreeMap::from([(fork.name().to_string(), vec![post])]),
        config: FixtureConfig::new(fork, ctx.chain_id),
        info,
    })
}

/// Rewrite a state test as a one-block chain.
///
/// The genesis is chosen so the block's derived base fee and excess blob gas
/// come out equal to the state environment's.
pub fn lower_state_test(spec: &StateTestSpec, fork: Fork) -> BlockchainTestSpec {
    let env = &spec.env;
    let genesis_environment = Environment {
        fee_recipient: env.fee_recipient,
        gas_limit: env.gas_limit,
        number: env.number.saturating_sub(1),
        timestamp: 0,
        difficulty: env.difficulty,
        prev_randao: env.prev_randao,
        base_fee_per_gas: env.base_fee_per_gas.map(|fee| fee * 8 / 7),
        excess_blob_gas: env
            .excess_blob_gas
            .map(|excess| excess + fork.target_blob_gas_per_block()),
        extra_data: env.extra_data.clone(),
        ..Default::default()
    };
    let block = BlockSpec {
        txs: vec![spec.tx.clone()],
        fee_recipient: Some(env.fee_recipient),
        timestamp: Some(env.timestamp),
        extra_data: Some(env.extra_data.clone()),
        prev_randao: env.prev_randao,
        withdrawals: env.withdrawals.clone(),
        parent_beacon_block_root: env.parent_beacon_block_root,
        exception: spec.tx.error.clone(),
        ..Default::default()
    };
    BlockchainTestSpec {
        genesis_environment,
        pre: spec.pre.clone(),
        blocks: vec![block],
        post: spec.post.clone(),
    }
}
